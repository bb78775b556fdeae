//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its closed vocabularies.
//! - Coerce untrusted stored data into that record shape.
//!
//! # Invariants
//! - Every record held by the store has passed through `normalize`.

pub mod normalize;
pub mod task;
