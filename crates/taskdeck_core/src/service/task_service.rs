//! Task use-case service.
//!
//! # Responsibility
//! - Provide the entry points a presentation layer calls on user intents.
//! - Return a fresh `TaskView` for rendering after each change.
//! - Emit one metadata-only log event per use-case call.
//!
//! # Invariants
//! - Service APIs never bypass store normalization or persistence.
//! - Task titles and descriptions are never written to logs.

use crate::model::task::{NewTask, TaskId, TaskRecord};
use crate::repo::task_store::{StoreResult, TaskStore};
use crate::storage::KeyValueStore;
use crate::view::{TaskView, ViewControls};
use log::{error, info};

/// Use-case wrapper around a `TaskStore`.
pub struct TaskService<S: KeyValueStore> {
    store: TaskStore<S>,
}

impl<S: KeyValueStore> TaskService<S> {
    /// Wraps an existing store. Does not load; call `load` first.
    pub fn new(store: TaskStore<S>) -> Self {
        Self { store }
    }

    /// Creates a service over `storage` and loads persisted tasks.
    pub fn open(storage: S) -> Self {
        let mut service = Self::new(TaskStore::new(storage));
        service.load();
        service
    }

    /// Reloads tasks from storage, discarding in-memory state.
    pub fn load(&mut self) -> usize {
        let count = self.store.load();
        info!("event=task_load module=service status=ok count={count}");
        count
    }

    /// Adds a task from form input.
    ///
    /// # Contract
    /// - Blank (whitespace-only) titles are declined with `Ok(None)`.
    /// - Returns the created task id otherwise.
    pub fn add(&mut self, request: NewTask) -> StoreResult<Option<TaskId>> {
        let category = request.category;
        let priority = request.priority;
        let has_due_date = !request.due_date.is_empty();

        match self.store.add(request) {
            Ok(Some(id)) => {
                info!(
                    "event=task_add module=service status=ok id={id} category={category} priority={priority} has_due_date={has_due_date} total={}",
                    self.store.len()
                );
                Ok(Some(id))
            }
            Ok(None) => {
                info!("event=task_add module=service status=skipped reason=blank_title");
                Ok(None)
            }
            Err(err) => {
                error!("event=task_add module=service status=error error={err}");
                Err(err)
            }
        }
    }

    /// Flips completion for `id`; unknown ids return `Ok(false)`.
    pub fn toggle(&mut self, id: &str) -> StoreResult<bool> {
        let result = self.store.toggle(id);
        log_outcome("task_toggle", id, &result);
        result
    }

    /// Deletes `id`; unknown ids return `Ok(false)`.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let result = self.store.delete(id);
        log_outcome("task_delete", id, &result);
        result
    }

    /// Derives the current view for the given controls.
    pub fn view(&self, controls: ViewControls) -> TaskView {
        TaskView::build(self.store.tasks(), controls)
    }

    /// Gets one task by id.
    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.store.get(id)
    }
}

fn log_outcome(event: &str, id: &str, result: &StoreResult<bool>) {
    match result {
        Ok(true) => info!("event={event} module=service status=ok id={id}"),
        Ok(false) => info!("event={event} module=service status=skipped reason=unknown_id id={id}"),
        Err(err) => error!("event={event} module=service status=error id={id} error={err}"),
    }
}
