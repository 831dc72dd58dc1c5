//! Task lifecycle service.
//!
//! Orchestrates create/read/update/delete/list against the injected
//! [`TaskStore`], applying request validation and merge-on-update semantics.
//! No retries happen here; transient backend failures propagate as
//! `DataAccess` and any retry policy belongs to the caller.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::types::{CreateTaskRequest, UpdateTaskRequest};
use crate::error::{TaskError, TaskResult};
use crate::store::TaskStore;
use crate::task::Task;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// All tasks, unfiltered.
    pub async fn list_tasks(&self) -> TaskResult<Vec<Task>> {
        self.store.list().await
    }

    /// Validate the request, build a fresh task, persist it.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskResult<Task> {
        if request.title.trim().is_empty() {
            return Err(TaskError::invalid_parameter(
                "title",
                "title is required for creating a task",
            ));
        }
        let task = Task::new(
            &request.title,
            request.description,
            request.due_date,
            request.priority,
        )?;
        self.store.create(&task).await?;
        Ok(task)
    }

    pub async fn get_task(&self, id: Uuid) -> TaskResult<Task> {
        self.store.get(id).await
    }

    /// Fetch the existing task, merge the supplied fields over it, persist
    /// the merged result via the conditional update.
    ///
    /// The merge must happen here: the store's `update` requires the record
    /// to already exist, so fetch-then-merge-then-write is mandatory. Two
    /// concurrent updates to the same id can still interleave between fetch
    /// and write (lost update); the exists-check only prevents writing over
    /// a deleted record.
    pub async fn update_task(&self, id: Uuid, request: UpdateTaskRequest) -> TaskResult<Task> {
        let existing = self.store.get(id).await?;
        let merged = existing.merge(&request.into_patch());
        self.store.update(&merged).await?;
        Ok(merged)
    }

    pub async fn delete_task(&self, id: Uuid) -> TaskResult<()> {
        self.store.delete(id).await
    }
}
