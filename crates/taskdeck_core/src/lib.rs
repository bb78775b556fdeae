//! Core domain logic for taskdeck.
//! This crate is the single source of truth for task invariants.

pub mod logging;
pub mod model;
pub mod ports;
pub mod repo;
pub mod service;
pub mod storage;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::normalize::normalize;
pub use model::task::{is_iso_calendar_date, Category, NewTask, Priority, TaskId, TaskRecord};
pub use ports::{
    Clock, FixedClock, IdGenerator, SequentialIds, SteppingClock, SystemClock, UuidGenerator,
};
pub use repo::task_store::{
    decode_tasks, encode_tasks, StoreError, StoreResult, TaskStore, STORAGE_KEY,
};
pub use service::task_service::TaskService;
pub use storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError};
pub use view::{derive_view, CategoryFilter, SortMode, TaskView, ViewControls};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
