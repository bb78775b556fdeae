//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted in the durable slot.
//! - Define the closed category/priority vocabularies and their defaults.
//!
//! # Invariants
//! - `id` is stable and never reused for another task in the same store.
//! - `category` and `priority` can only hold one of their enum literals.
//! - `due_date` is either empty (no due date) or a caller-provided string.
//!
//! # See also
//! - crate::model::normalize

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});

/// Stable identifier for a task record.
///
/// Kept as a type alias because legacy stored ids may be any string.
pub type TaskId = String;

/// Fixed classification tag for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Work,
    Study,
    /// Default for new and unrecognized input.
    #[default]
    Life,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [Category::Work, Category::Study, Category::Life];

    /// Parses the exact wire literal (`Work|Study|Life`), case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Work" => Some(Self::Work),
            "Study" => Some(Self::Study),
            "Life" => Some(Self::Life),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Study => "Study",
            Self::Life => "Life",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    /// Default for new and unrecognized input.
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parses the exact wire literal (`Low|Medium|High`), case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Numeric ordering used by view sorting: `High`=3, `Medium`=2, `Low`=1.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, fully-normalized task record.
///
/// Serialized with camelCase field names so stored payloads keep the
/// `dueDate`/`createdAt` keys written by earlier versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub category: Category,
    pub priority: Priority,
    /// `YYYY-MM-DD` or empty when unset.
    pub due_date: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
}

impl TaskRecord {
    /// Returns whether a due date is set.
    pub fn has_due_date(&self) -> bool {
        !self.due_date.is_empty()
    }

    /// Flips the completion flag. This is the only in-place mutation a
    /// stored record ever sees.
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }
}

/// Input for creating a task through the store.
///
/// Text fields are trimmed on creation; a blank title makes the add a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// `YYYY-MM-DD` or empty.
    pub due_date: String,
}

impl NewTask {
    /// Creates a request with default category/priority and no due date.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Checks the `YYYY-MM-DD` shape produced by calendar date inputs.
///
/// Only shape and month/day ranges are checked; `2024-02-31` passes.
pub fn is_iso_calendar_date(value: &str) -> bool {
    ISO_DATE_RE.is_match(value)
}
