//! Task storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database keyed by task id

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::task::Task;

/// Task store contract - implemented by all storage backends.
///
/// Writes follow the conditional semantics of the backing key-value table:
/// `create` is unconditional (last writer wins on an id collision), while
/// `update` and `delete` require the record to already exist and report
/// `NotFound` otherwise.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Return every record, following backend pagination until exhausted.
    /// No ordering guarantee.
    async fn list(&self) -> TaskResult<Vec<Task>>;

    /// Write a task unconditionally.
    async fn create(&self, task: &Task) -> TaskResult<()>;

    /// Fetch a single task by id. `NotFound` when absent.
    async fn get(&self, id: Uuid) -> TaskResult<Task>;

    /// Overwrite all mutable fields of an existing task. `NotFound` when no
    /// record with that id exists.
    async fn update(&self, task: &Task) -> TaskResult<()>;

    /// Remove an existing task. `NotFound` when no record with that id
    /// exists.
    async fn delete(&self, id: Uuid) -> TaskResult<()>;
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreKind {
    Memory,
    #[default]
    Sqlite,
}

impl TaskStoreKind {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a task store based on kind and configuration.
pub async fn create_task_store(
    kind: TaskStoreKind,
    data_dir: PathBuf,
) -> TaskResult<Arc<dyn TaskStore>> {
    match kind {
        TaskStoreKind::Memory => Ok(Arc::new(InMemoryTaskStore::new())),
        TaskStoreKind::Sqlite => {
            let store = SqliteTaskStore::open(data_dir).await?;
            Ok(Arc::new(store))
        }
    }
}
