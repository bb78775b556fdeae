//! Derived, display-ready projections of the task store.
//!
//! # Responsibility
//! - Filter by category and sort by the selected mode.
//! - Package the projection with the aggregate counts shown to users.
//!
//! # Invariants
//! - Derivation is pure and never mutates its input.
//! - Sorting is stable: equal keys keep store order.

pub mod derive;

pub use derive::{derive_view, CategoryFilter, SortMode, TaskView, ViewControls};
