use async_trait::async_trait;

use crate::model::dashboard::DashboardView;
use crate::model::task::TaskStatus;

/// Failure of a call into the task store. The `Display` text is what the
/// user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The request never got an answer
    #[error("connection to task store failed: {0}")]
    Transport(String),
    /// The store refused the request
    #[error("{0}")]
    Rejected(String),
    /// The answer did not have the expected shape
    #[error("task store sent a malformed response: {0}")]
    Schema(String),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// The command interface of the authoritative task store.
///
/// Every call is asynchronous and may fail. Mutations return nothing; callers
/// refetch the dashboard to see their effect.
#[async_trait]
pub trait TaskCommands: Send + Sync {
    async fn get_dashboard_data(&self) -> CommandResult<DashboardView>;

    /// Create a `next` task from raw capture text.
    async fn quick_capture(&self, title: &str) -> CommandResult<()>;

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> CommandResult<()>;

    async fn delete_task(&self, id: &str) -> CommandResult<()>;

    async fn rename_task(&self, id: &str, title: &str) -> CommandResult<()>;

    /// Mark the periodic review as done now.
    async fn complete_review(&self) -> CommandResult<()>;
}

#[async_trait]
impl<T: TaskCommands + ?Sized> TaskCommands for std::sync::Arc<T> {
    async fn get_dashboard_data(&self) -> CommandResult<DashboardView> {
        (**self).get_dashboard_data().await
    }

    async fn quick_capture(&self, title: &str) -> CommandResult<()> {
        (**self).quick_capture(title).await
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> CommandResult<()> {
        (**self).update_task_status(id, status).await
    }

    async fn delete_task(&self, id: &str) -> CommandResult<()> {
        (**self).delete_task(id).await
    }

    async fn rename_task(&self, id: &str, title: &str) -> CommandResult<()> {
        (**self).rename_task(id, title).await
    }

    async fn complete_review(&self) -> CommandResult<()> {
        (**self).complete_review().await
    }
}
