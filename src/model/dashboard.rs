use serde::{Deserialize, Serialize};

use super::task::Task;

/// Read-only snapshot shown on the dashboard: the active task plus the
/// next and waiting queues. Recomputed on every fetch, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardView {
    pub now_task: Option<Task>,
    #[serde(default)]
    pub next_tasks: Vec<Task>,
    #[serde(default)]
    pub waiting_tasks: Vec<Task>,
    #[serde(default)]
    pub review_due_in_days: i64,
}

impl DashboardView {
    /// All tasks in display order: now, then next, then waiting.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.now_task
            .iter()
            .chain(self.next_tasks.iter())
            .chain(self.waiting_tasks.iter())
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks().find(|t| t.id == id)
    }

    pub fn has_active(&self) -> bool {
        self.now_task.is_some()
    }

    pub fn is_review_due(&self) -> bool {
        self.review_due_in_days <= 0
    }
}
