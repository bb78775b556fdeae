//! Task collection ownership and write-through persistence.
//!
//! # Responsibility
//! - Hold the authoritative, insertion-ordered task sequence.
//! - Mirror every change to the durable key-value slot.
//!
//! # Invariants
//! - Every held record is normalized.
//! - Storage is written after each mutation that changed the sequence.

pub mod task_store;
