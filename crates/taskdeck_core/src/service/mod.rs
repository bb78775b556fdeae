//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store mutations and view derivation into use-case APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod task_service;
