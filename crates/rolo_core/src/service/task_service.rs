//! Task use-case service.
//!
//! # Invariants
//! - Completing a task deletes it immediately. The original product shows
//!   a short fade first; that delay is presentation, not core semantics,
//!   and there is no "done but kept" state to transition into.

use crate::clock::Clock;
use crate::model::task::Task;
use crate::model::{record_id_from_millis, RecordId};
use crate::service::{decode_strict, normalize_optional, ServiceError, ServiceResult};
use crate::session::UserId;
use crate::store::{Collection, EntityStore};
use log::info;

/// Request model for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    /// Optional `YYYY-MM-DD` due date.
    pub due_date: Option<String>,
    /// Optional weak reference to a contact.
    pub contact_id: Option<RecordId>,
}

/// Entry points for the tasks collection.
pub struct TaskService<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    clock: &'a dyn Clock,
    user: UserId,
}

impl<'a, S: EntityStore + ?Sized> TaskService<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock, user: UserId) -> Self {
        Self { store, clock, user }
    }

    pub fn add(&self, request: NewTask) -> ServiceResult<Task> {
        let now_millis = self.clock.epoch_millis();
        let task = Task {
            id: record_id_from_millis(now_millis),
            title: request.title.trim().to_string(),
            due_date: normalize_optional(request.due_date),
            contact_id: normalize_optional(request.contact_id),
            completed: false,
            created_at: now_millis,
        };
        task.validate()?;

        let doc = serde_json::to_value(&task).map_err(ServiceError::Encode)?;
        self.store.put(&self.user, Collection::Tasks, &task.id, doc)?;
        info!("event=task_added module=service status=ok task_id={}", task.id);
        Ok(task)
    }

    /// Marks a task complete, which removes it from the collection.
    pub fn complete(&self, id: &RecordId) -> ServiceResult<()> {
        self.store.delete(&self.user, Collection::Tasks, id)?;
        info!("event=task_completed module=service status=ok task_id={id}");
        Ok(())
    }

    /// Removes a task without completing it.
    pub fn delete(&self, id: &RecordId) -> ServiceResult<()> {
        self.store.delete(&self.user, Collection::Tasks, id)?;
        info!("event=task_deleted module=service status=ok task_id={id}");
        Ok(())
    }

    /// All open tasks in insertion order, strictly decoded.
    pub fn list(&self) -> ServiceResult<Vec<Task>> {
        decode_strict(self.store.get(&self.user, Collection::Tasks)?)
    }
}
