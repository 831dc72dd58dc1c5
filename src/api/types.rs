//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::task::{TaskPatch, TaskPriority, TaskStatus};

/// Request to create a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title (required, non-empty)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional date-like text, stored as-is
    pub due_date: Option<String>,

    /// Priority (required, one of the closed set)
    pub priority: TaskPriority,
}

/// Partial update for an existing task. Every field is optional; omitted
/// fields keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl UpdateTaskRequest {
    pub fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            status: self.status,
            priority: self.priority,
        }
    }
}

/// Response after deleting a task.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteTaskResponse {
    pub message: String,
}

/// Response for the current-user endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub username: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub auth_required: bool,
}
