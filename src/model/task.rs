use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
///
/// ```text
/// next ──start──▶ now ──complete──▶ done
///  │ ▲             │ │
///  │ └──demote─────┘ └──defer──▶ waiting
///  └──────────────complete──────────▶ done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Now,
    Next,
    Waiting,
    Someday,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Now,
        TaskStatus::Next,
        TaskStatus::Waiting,
        TaskStatus::Someday,
        TaskStatus::Done,
    ];

    /// States reachable from this one in a single transition.
    pub const fn allowed_next_states(self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Next => &[
                TaskStatus::Now,
                TaskStatus::Waiting,
                TaskStatus::Someday,
                TaskStatus::Done,
            ],
            TaskStatus::Now => &[TaskStatus::Next, TaskStatus::Waiting, TaskStatus::Done],
            TaskStatus::Waiting => &[
                TaskStatus::Now,
                TaskStatus::Next,
                TaskStatus::Someday,
                TaskStatus::Done,
            ],
            TaskStatus::Someday => &[TaskStatus::Next, TaskStatus::Done],
            TaskStatus::Done => &[],
        }
    }

    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        self.allowed_next_states().contains(&next)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Now => "now",
            TaskStatus::Next => "next",
            TaskStatus::Waiting => "waiting",
            TaskStatus::Someday => "someday",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse_status(s: &str) -> Option<TaskStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "now" => Some(TaskStatus::Now),
            "next" => Some(TaskStatus::Next),
            "waiting" => Some(TaskStatus::Waiting),
            "someday" => Some(TaskStatus::Someday),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a task came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    #[default]
    QuickCapture,
    Manual,
    Import,
}

impl TaskSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskSource::QuickCapture => "quick_capture",
            TaskSource::Manual => "manual",
            TaskSource::Import => "import",
        }
    }
}

/// Shape errors for a task
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("task {0} is done but has no completion time")]
    MissingCompletedAt(String),
    #[error("task {0} has a completion time but is not done")]
    UnexpectedCompletedAt(String),
    #[error("task {0} was updated before it was created")]
    UpdatedBeforeCreated(String),
}

/// A unit of work. Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_input: Option<String>,
    #[serde(default)]
    pub source: TaskSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub sync_version: u64,
}

impl Task {
    /// Build a fresh `next` task created at `now`, validating the title.
    pub fn new(id: String, title: &str, now: i64) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Task {
            id,
            title: title.to_string(),
            status: TaskStatus::Next,
            context: None,
            scheduled_for: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            original_input: None,
            source: TaskSource::default(),
            tags: Vec::new(),
            sync_version: 1,
        })
    }

    /// Check the shape rules every stored or received task must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        match (self.status, self.completed_at) {
            (TaskStatus::Done, None) => {
                return Err(ValidationError::MissingCompletedAt(self.id.clone()));
            }
            (status, Some(_)) if status != TaskStatus::Done => {
                return Err(ValidationError::UnexpectedCompletedAt(self.id.clone()));
            }
            _ => {}
        }
        if self.updated_at < self.created_at {
            return Err(ValidationError::UpdatedBeforeCreated(self.id.clone()));
        }
        Ok(())
    }

    /// Bump the version counter and the modification time.
    pub fn touch(&mut self, now: i64) {
        self.sync_version += 1;
        self.updated_at = now.max(self.created_at);
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Now
    }
}
