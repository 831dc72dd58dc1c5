//! In-memory task store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::TaskStore;
use crate::error::{TaskError, TaskResult};
use crate::task::Task;

#[derive(Clone)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list(&self) -> TaskResult<Vec<Task>> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn create(&self, task: &Task) -> TaskResult<()> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> TaskResult<Task> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(TaskError::NotFound { id })
    }

    async fn update(&self, task: &Task) -> TaskResult<()> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(&task.id)
            .ok_or(TaskError::NotFound { id: task.id })?;
        *entry = task.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> TaskResult<()> {
        match self.tasks.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(TaskError::NotFound { id }),
        }
    }
}
