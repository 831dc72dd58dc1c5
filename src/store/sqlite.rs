//! SQLite-based task store.
//!
//! One table keyed by task id. `update` and `delete` are conditional writes:
//! the affected-row count stands in for the backing table's
//! "attribute exists" condition, so a zero-row result maps to `NotFound`
//! rather than silently creating or ignoring the record.
//!
//! All rusqlite work runs inside `spawn_blocking`; the connection is shared
//! behind an `Arc<Mutex>` and locked with `blocking_lock` on the worker
//! thread.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::TaskStore;
use crate::error::{TaskError, TaskResult};
use crate::task::{Task, TaskPriority, TaskStatus};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    due_date TEXT,
    status TEXT NOT NULL,
    priority TEXT NOT NULL
);
"#;

/// Rows fetched per scan page. The full listing follows pages until a short
/// page, the same continuation loop the backing table's scan API requires.
const SCAN_PAGE_SIZE: usize = 100;

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn open(data_dir: PathBuf) -> TaskResult<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| TaskError::DataAccess(format!("Failed to create data dir: {}", e)))?;
        let db_path = data_dir.join("tasks.db");

        // Open and migrate in a blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| TaskError::DataAccess(format!("Failed to open database: {}", e)))?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| TaskError::DataAccess(format!("Failed to run schema: {}", e)))?;
            Ok::<_, TaskError>(conn)
        })
        .await
        .map_err(join_error)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Raw row before enum/id decoding.
type TaskRow = (String, String, Option<String>, Option<String>, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_row(row: TaskRow) -> TaskResult<Task> {
    let (id, title, description, due_date, status, priority) = row;
    let id = Uuid::parse_str(&id)
        .map_err(|e| TaskError::DataAccess(format!("Corrupt task id {}: {}", id, e)))?;
    Ok(Task {
        id,
        title,
        description,
        due_date,
        status: TaskStatus::parse(&status)?,
        priority: TaskPriority::parse(&priority)?,
    })
}

fn data_access(context: &str, e: rusqlite::Error) -> TaskError {
    TaskError::DataAccess(format!("{}: {}", context, e))
}

fn join_error(e: tokio::task::JoinError) -> TaskError {
    TaskError::DataAccess(format!("Task join error: {}", e))
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list(&self) -> TaskResult<Vec<Task>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut tasks = Vec::new();
            let mut offset = 0usize;
            loop {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, title, description, due_date, status, priority
                         FROM tasks LIMIT ?1 OFFSET ?2",
                    )
                    .map_err(|e| data_access("Failed to prepare scan", e))?;
                let page: Vec<TaskRow> = stmt
                    .query_map(params![SCAN_PAGE_SIZE as i64, offset as i64], read_row)
                    .map_err(|e| data_access("Failed to scan tasks", e))?
                    .collect::<rusqlite::Result<_>>()
                    .map_err(|e| data_access("Failed to read task row", e))?;

                let page_len = page.len();
                for row in page {
                    tasks.push(decode_row(row)?);
                }
                if page_len < SCAN_PAGE_SIZE {
                    break;
                }
                offset += page_len;
            }
            Ok(tasks)
        })
        .await
        .map_err(join_error)?
    }

    async fn create(&self, task: &Task) -> TaskResult<()> {
        let conn = self.conn.clone();
        let task = task.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT OR REPLACE INTO tasks (id, title, description, due_date, status, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    task.id.to_string(),
                    task.title,
                    task.description,
                    task.due_date,
                    task.status.as_str(),
                    task.priority.as_str(),
                ],
            )
            .map_err(|e| data_access("Failed to create task", e))?;
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn get(&self, id: Uuid) -> TaskResult<Task> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let row: Option<TaskRow> = conn
                .query_row(
                    "SELECT id, title, description, due_date, status, priority
                     FROM tasks WHERE id = ?1",
                    params![id.to_string()],
                    read_row,
                )
                .optional()
                .map_err(|e| data_access("Failed to get task", e))?;
            match row {
                Some(row) => decode_row(row),
                None => Err(TaskError::NotFound { id }),
            }
        })
        .await
        .map_err(join_error)?
    }

    async fn update(&self, task: &Task) -> TaskResult<()> {
        let conn = self.conn.clone();
        let task = task.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let affected = conn
                .execute(
                    "UPDATE tasks
                     SET title = ?2, description = ?3, due_date = ?4, status = ?5, priority = ?6
                     WHERE id = ?1",
                    params![
                        task.id.to_string(),
                        task.title,
                        task.description,
                        task.due_date,
                        task.status.as_str(),
                        task.priority.as_str(),
                    ],
                )
                .map_err(|e| data_access("Failed to update task", e))?;
            if affected == 0 {
                return Err(TaskError::NotFound { id: task.id });
            }
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn delete(&self, id: Uuid) -> TaskResult<()> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let affected = conn
                .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
                .map_err(|e| data_access("Failed to delete task", e))?;
            if affected == 0 {
                return Err(TaskError::NotFound { id });
            }
            Ok(())
        })
        .await
        .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn open_store(dir: &tempfile::TempDir) -> SqliteTaskStore {
        SqliteTaskStore::open(dir.path().to_path_buf())
            .await
            .expect("open store")
    }

    fn task(title: &str) -> Task {
        Task::new(title, None, None, TaskPriority::Low).expect("valid task")
    }

    #[tokio::test]
    async fn round_trips_all_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir).await;

        let created = Task::new(
            "Ship release",
            Some("cut the tag".to_string()),
            Some("2026-10-01".to_string()),
            TaskPriority::Urgent,
        )
        .expect("valid task");
        store.create(&created).await.expect("create");

        let fetched = store.get(created.id).await.expect("get");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let created = task("Durable");
        {
            let store = open_store(&dir).await;
            store.create(&created).await.expect("create");
        }
        let store = open_store(&dir).await;
        assert!(store.is_persistent());
        let fetched = store.get(created.id).await.expect("get");
        assert_eq!(fetched.title, "Durable");
    }

    #[tokio::test]
    async fn conditional_update_and_delete_report_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir).await;

        let phantom = task("never written");
        assert!(matches!(
            store.update(&phantom).await.unwrap_err(),
            TaskError::NotFound { .. }
        ));
        assert!(matches!(
            store.delete(phantom.id).await.unwrap_err(),
            TaskError::NotFound { .. }
        ));

        // Existing records still update and delete normally
        let mut stored = task("real");
        store.create(&stored).await.expect("create");
        stored.status = TaskStatus::Done;
        store.update(&stored).await.expect("update");
        assert_eq!(
            store.get(stored.id).await.expect("get").status,
            TaskStatus::Done
        );
        store.delete(stored.id).await.expect("delete");
        assert!(matches!(
            store.get(stored.id).await.unwrap_err(),
            TaskError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn list_spans_multiple_scan_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir).await;

        let total = SCAN_PAGE_SIZE * 2 + 17;
        let mut expected = HashSet::new();
        for i in 0..total {
            let t = task(&format!("task {}", i));
            expected.insert(t.id);
            store.create(&t).await.expect("create");
        }

        let listed = store.list().await.expect("list");
        assert_eq!(listed.len(), total);
        let listed_ids: HashSet<Uuid> = listed.into_iter().map(|t| t.id).collect();
        assert_eq!(listed_ids, expected);
    }

    /// Operations run on blocking worker threads; interleaved concurrent
    /// calls from the async runtime must all complete and land.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_operations_complete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(open_store(&dir).await);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let t = task(&format!("concurrent {}", i));
                store.create(&t).await.expect("create");
                store.get(t.id).await.expect("get")
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        assert_eq!(store.list().await.expect("list").len(), 8);
    }
}
