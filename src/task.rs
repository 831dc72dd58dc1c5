//! Task entity and its validation rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};

/// Task workflow status. Closed set; free-form text is rejected at every
/// boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn parse(s: &str) -> TaskResult<Self> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(TaskError::invalid_parameter(
                "status",
                format!("unknown status: {}", other),
            )),
        }
    }
}

/// Task priority. Required at creation, no default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }

    pub fn parse(s: &str) -> TaskResult<Self> {
        match s {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            "URGENT" => Ok(TaskPriority::Urgent),
            other => Err(TaskError::invalid_parameter(
                "priority",
                format!("unknown priority: {}", other),
            )),
        }
    }
}

/// A to-do item record. `id` is assigned at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// Partial update applied over an existing task. Fields left `None` (or set
/// to empty text) keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}

impl Task {
    /// Build a fresh task with a generated id and `TODO` status.
    pub fn new(
        title: &str,
        description: Option<String>,
        due_date: Option<String>,
        priority: TaskPriority,
    ) -> TaskResult<Self> {
        if title.trim().is_empty() {
            return Err(TaskError::invalid_parameter(
                "title",
                "title is required for creating a task",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description,
            due_date,
            status: TaskStatus::Todo,
            priority,
        })
    }

    /// Merge a partial update over this task. Each patch field overrides the
    /// existing one only when present and non-empty; `id` always comes from
    /// `self`.
    pub fn merge(&self, patch: &TaskPatch) -> Task {
        Task {
            id: self.id,
            title: non_empty(patch.title.as_ref()).unwrap_or_else(|| self.title.clone()),
            description: non_empty(patch.description.as_ref()).or_else(|| self.description.clone()),
            due_date: non_empty(patch.due_date.as_ref()).or_else(|| self.due_date.clone()),
            status: patch.status.unwrap_or(self.status),
            priority: patch.priority.unwrap_or(self.priority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task::new(
            "Write report",
            Some("quarterly numbers".to_string()),
            Some("2026-09-15".to_string()),
            TaskPriority::High,
        )
        .expect("valid task")
    }

    #[test]
    fn new_task_defaults_to_todo_with_fresh_id() {
        let a = sample();
        let b = sample();
        assert_eq!(a.status, TaskStatus::Todo);
        assert!(!a.id.is_nil());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn new_task_rejects_empty_title() {
        let err = Task::new("", None, None, TaskPriority::Low).unwrap_err();
        assert!(matches!(err, TaskError::InvalidParameter { .. }));
        let err = Task::new("   ", None, None, TaskPriority::Low).unwrap_err();
        assert!(matches!(err, TaskError::InvalidParameter { .. }));
    }

    #[test]
    fn merge_overrides_only_supplied_fields() {
        let existing = sample();
        let patch = TaskPatch {
            title: Some("Write final report".to_string()),
            ..Default::default()
        };
        let merged = existing.merge(&patch);
        assert_eq!(merged.id, existing.id);
        assert_eq!(merged.title, "Write final report");
        assert_eq!(merged.description, existing.description);
        assert_eq!(merged.due_date, existing.due_date);
        assert_eq!(merged.status, existing.status);
        assert_eq!(merged.priority, existing.priority);
    }

    #[test]
    fn merge_ignores_empty_text_fields() {
        let existing = sample();
        let patch = TaskPatch {
            title: Some(String::new()),
            description: Some("  ".to_string()),
            ..Default::default()
        };
        let merged = existing.merge(&patch);
        assert_eq!(merged.title, existing.title);
        assert_eq!(merged.description, existing.description);
    }

    #[test]
    fn merge_applies_status_and_priority() {
        let existing = sample();
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            priority: Some(TaskPriority::Urgent),
            ..Default::default()
        };
        let merged = existing.merge(&patch);
        assert_eq!(merged.status, TaskStatus::Done);
        assert_eq!(merged.priority, TaskPriority::Urgent);
        assert_eq!(merged.title, existing.title);
    }

    #[test]
    fn status_and_priority_round_trip_as_text() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(TaskStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(TaskStatus::parse("PAUSED").is_err());
        for priority in [
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Urgent,
        ] {
            assert_eq!(TaskPriority::parse(priority.as_str()).unwrap(), priority);
        }
        assert!(TaskPriority::parse("CRITICAL").is_err());
    }

    #[test]
    fn serializes_with_screaming_snake_case_values() {
        let json = serde_json::to_value(&sample()).expect("serialize");
        assert_eq!(json["status"], "TODO");
        assert_eq!(json["priority"], "HIGH");
    }
}
