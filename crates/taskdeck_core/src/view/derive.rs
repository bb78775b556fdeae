//! Filter + sort pipeline.

use crate::model::task::{Category, TaskRecord};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Category selector; `All` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Parses a control literal (`All|Work|Study|Life`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "All" => Some(Self::All),
            other => Category::parse(other).map(Self::Only),
        }
    }

    /// Parses a control literal, falling back to `All`.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn matches(self, task: &TaskRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => task.category == category,
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => Display::fmt(category, f),
        }
    }
}

/// Display ordering for the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Earliest due date first; undated tasks last.
    DueAsc,
    /// Highest priority first.
    PriorityDesc,
}

impl SortMode {
    /// Parses a control literal (`created_desc|due_asc|priority_desc`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_desc" => Some(Self::CreatedDesc),
            "due_asc" => Some(Self::DueAsc),
            "priority_desc" => Some(Self::PriorityDesc),
            _ => None,
        }
    }

    /// Parses a control literal, falling back to `CreatedDesc`.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedDesc => "created_desc",
            Self::DueAsc => "due_asc",
            Self::PriorityDesc => "priority_desc",
        }
    }

    fn compare(self, a: &TaskRecord, b: &TaskRecord) -> Ordering {
        match self {
            Self::CreatedDesc => newest_first(a, b),
            Self::DueAsc => match (a.has_due_date(), b.has_due_date()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => newest_first(a, b),
                (true, true) => a
                    .due_date
                    .cmp(&b.due_date)
                    .then_with(|| highest_priority_first(a, b)),
            },
            Self::PriorityDesc => highest_priority_first(a, b).then_with(|| newest_first(a, b)),
        }
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control state owned by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewControls {
    pub filter: CategoryFilter,
    pub sort: SortMode,
}

/// Derived list plus the counts rendered next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub items: Vec<TaskRecord>,
    /// Tasks in the store, regardless of filter.
    pub total_count: usize,
    /// Tasks in `items`.
    pub visible_count: usize,
}

impl TaskView {
    /// Builds a view from the full store contents.
    pub fn build(tasks: &[TaskRecord], controls: ViewControls) -> Self {
        let items = derive_view(tasks, controls.filter, controls.sort);
        Self {
            visible_count: items.len(),
            total_count: tasks.len(),
            items,
        }
    }

    /// True when the filter hides at least one task.
    pub fn is_filtered(&self) -> bool {
        self.visible_count != self.total_count
    }
}

/// Returns the filtered and sorted projection of `tasks`.
pub fn derive_view(
    tasks: &[TaskRecord],
    filter: CategoryFilter,
    sort: SortMode,
) -> Vec<TaskRecord> {
    let mut items: Vec<TaskRecord> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    items.sort_by(|a, b| sort.compare(a, b));
    items
}

fn newest_first(a: &TaskRecord, b: &TaskRecord) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

fn highest_priority_first(a: &TaskRecord, b: &TaskRecord) -> Ordering {
    b.priority.rank().cmp(&a.priority.rank())
}
