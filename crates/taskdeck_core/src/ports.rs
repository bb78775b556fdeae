//! Time and identity sources used when creating or normalizing tasks.
//!
//! # Responsibility
//! - Abstract "now" and "fresh id" so normalization is deterministic in tests.
//!
//! # Invariants
//! - `IdGenerator` ids are unique for the lifetime of one store.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Source of the current time in Unix epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        // A clock set before 1970 reports 0 instead of failing.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Clock that advances by one millisecond per reading.
///
/// Gives each created task a distinct `created_at` without sleeping.
#[derive(Debug, Default)]
pub struct SteppingClock {
    next: Cell<i64>,
}

impl SteppingClock {
    pub fn starting_at(start_ms: i64) -> Self {
        Self {
            next: Cell::new(start_ms),
        }
    }
}

impl Clock for SteppingClock {
    fn now_ms(&self) -> i64 {
        let current = self.next.get();
        self.next.set(current.saturating_add(1));
        current
    }
}

/// Source of fresh task ids.
pub trait IdGenerator {
    fn fresh_id(&self) -> String;
}

/// Random UUID v4 ids, hyphenated lowercase.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn fresh_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Sequential `{prefix}-{n}` ids for tests and fixtures.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: &'static str,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn fresh_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}-{n}", self.prefix)
    }
}
