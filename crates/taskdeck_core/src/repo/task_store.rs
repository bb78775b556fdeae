//! Task store over a `KeyValueStore` slot.
//!
//! # Responsibility
//! - Load and normalize the persisted task array.
//! - Apply add/toggle/delete and persist the full array afterwards.
//!
//! # Invariants
//! - New tasks are prepended; display order is decided by the view layer.
//! - Corrupted or missing stored data yields an empty store, never an error.
//! - Writes are last-write-wins; there is no merge with other writers.

use crate::model::normalize::normalize;
use crate::model::task::{NewTask, TaskId, TaskRecord};
use crate::ports::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::storage::{KeyValueStore, StorageError};
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Version-tagged storage key for the task array.
pub const STORAGE_KEY: &str = "todo_list_v2";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to persist the task sequence.
///
/// The in-memory sequence already reflects the mutation when this is
/// returned; the next successful write converges storage.
#[derive(Debug)]
pub enum StoreError {
    Encode(serde_json::Error),
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
            Self::Storage(err) => write!(f, "failed to persist tasks: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Parses a stored payload into normalized records.
///
/// Returns `None` when the payload is not JSON or not a JSON array.
pub fn decode_tasks(
    payload: &str,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> Option<Vec<TaskRecord>> {
    match serde_json::from_str::<Value>(payload).ok()? {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|raw| normalize(raw, clock, ids))
                .collect(),
        ),
        _ => None,
    }
}

/// Serializes records into the stored payload shape.
pub fn encode_tasks(tasks: &[TaskRecord]) -> StoreResult<String> {
    Ok(serde_json::to_string(tasks)?)
}

/// Authoritative task collection mirrored to one storage key.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    tasks: Vec<TaskRecord>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Creates an empty store using wall-clock time and UUID v4 ids.
    ///
    /// Call `load` to pull previously persisted tasks.
    pub fn new(storage: S) -> Self {
        Self::with_sources(storage, Box::new(SystemClock), Box::new(UuidGenerator))
    }

    /// Creates an empty store with explicit time and id sources.
    pub fn with_sources(storage: S, clock: Box<dyn Clock>, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            storage,
            tasks: Vec::new(),
            clock,
            ids,
        }
    }

    /// Replaces in-memory state with the persisted task array.
    ///
    /// Missing, unreadable or malformed data leaves the store empty. When
    /// normalization changed the payload (generated ids, defaulted
    /// `createdAt`, coerced fields) the normalized array is written back so
    /// later sessions see the same ids. Returns the number of loaded tasks.
    pub fn load(&mut self) -> usize {
        self.tasks = Vec::new();
        match self.storage.get(STORAGE_KEY) {
            Ok(Some(payload)) => {
                match decode_tasks(&payload, self.clock.as_ref(), self.ids.as_ref()) {
                    Some(tasks) => {
                        self.tasks = tasks;
                        self.write_back_if_changed(&payload);
                    }
                    None => warn!(
                        "event=store_load module=repo status=discarded reason=malformed_payload bytes={}",
                        payload.len()
                    ),
                }
            }
            Ok(None) => {}
            Err(err) => error!(
                "event=store_load module=repo status=error error_code=storage_read_failed error={err}"
            ),
        }

        info!(
            "event=store_load module=repo status=ok count={}",
            self.tasks.len()
        );
        self.tasks.len()
    }

    /// Creates and prepends a task.
    ///
    /// Returns `Ok(None)` without touching storage when the trimmed title is
    /// empty.
    pub fn add(&mut self, request: NewTask) -> StoreResult<Option<TaskId>> {
        let title = request.title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let raw = serde_json::json!({
            "id": self.ids.fresh_id(),
            "title": title,
            "description": request.description.trim(),
            "completed": false,
            "category": request.category,
            "priority": request.priority,
            "dueDate": request.due_date,
            "createdAt": self.clock.now_ms(),
        });
        let task = normalize(&raw, self.clock.as_ref(), self.ids.as_ref());
        let id = task.id.clone();

        self.tasks.insert(0, task);
        self.persist()?;
        Ok(Some(id))
    }

    /// Flips `completed` on the task with `id`.
    ///
    /// Returns `Ok(false)` when no task matches; storage is not written.
    pub fn toggle(&mut self, id: &str) -> StoreResult<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };
        task.toggle_completed();
        self.persist()?;
        Ok(true)
    }

    /// Removes the task with `id`.
    ///
    /// Returns `Ok(false)` when no task matches; storage is not written.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Current tasks in insertion order (newest first).
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Borrows the backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Load never fails; a failed rewrite is only logged by `persist`.
    fn write_back_if_changed(&self, stored: &str) {
        if encode_tasks(&self.tasks).is_ok_and(|payload| payload == stored) {
            return;
        }
        if self.persist().is_ok() {
            info!(
                "event=store_load module=repo status=rewritten count={}",
                self.tasks.len()
            );
        }
    }

    fn persist(&self) -> StoreResult<()> {
        let payload = encode_tasks(&self.tasks)?;
        self.storage.set(STORAGE_KEY, &payload).inspect_err(|err| {
            error!(
                "event=store_persist module=repo status=error error_code=storage_write_failed error={err}"
            );
        })?;
        Ok(())
    }
}
