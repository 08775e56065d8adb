use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::model::dashboard::DashboardView;
use crate::model::task::{Task, TaskStatus};
use crate::ops::projection::project_dashboard;
use crate::sync::commands::{CommandError, CommandResult, TaskCommands};
use crate::sync::local::LocalTaskStore;

/// One command, as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case", deny_unknown_fields)]
pub enum Request {
    GetDashboardData,
    QuickCapture {
        title: String,
    },
    UpdateTaskStatus {
        id: String,
        status: TaskStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_version: Option<u64>,
    },
    DeleteTask {
        id: String,
    },
    RenameTask {
        id: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_version: Option<u64>,
    },
    CompleteReview,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::GetDashboardData => "get_dashboard_data",
            Request::QuickCapture { .. } => "quick_capture",
            Request::UpdateTaskStatus { .. } => "update_task_status",
            Request::DeleteTask { .. } => "delete_task",
            Request::RenameTask { .. } => "rename_task",
            Request::CompleteReview => "complete_review",
        }
    }
}

/// Reply to one request: `{"ok":true,"data":...}` or `{"ok":false,"error":"..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(data: Option<Value>) -> Self {
        Response {
            ok: true,
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Response {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Check the envelope and unwrap the payload.
    pub fn into_result(self) -> CommandResult<Option<Value>> {
        match (self.ok, self.error) {
            (true, None) => Ok(self.data),
            (true, Some(_)) => Err(CommandError::Schema(
                "success response carries an error".into(),
            )),
            (false, Some(message)) => Err(CommandError::Rejected(message)),
            (false, None) => Err(CommandError::Schema(
                "failure response without a message".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Server side
// ---------------------------------------------------------------------------

/// Serve one JSON request line against the store, returning the response line.
pub async fn handle_request(store: &LocalTaskStore, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(store, request).await,
        Err(e) => Response::failure(format!("invalid request: {}", e)),
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(
            r#"{{"ok":false,"error":{}}}"#,
            Value::String(format!("could not encode response: {}", e))
        )
    })
}

async fn dispatch(store: &LocalTaskStore, request: Request) -> Response {
    debug!(cmd = request.name(), "request received");
    let result = match request {
        Request::GetDashboardData => store
            .get_dashboard_data()
            .await
            .and_then(|view| encode(&view).map(Some)),
        Request::QuickCapture { title } => store.quick_capture(&title).await.map(|_| None),
        Request::UpdateTaskStatus {
            id,
            status,
            expected_version,
        } => store
            .set_status(&id, status, expected_version)
            .map(|_| None)
            .map_err(CommandError::from),
        Request::DeleteTask { id } => store.delete_task(&id).await.map(|_| None),
        Request::RenameTask {
            id,
            title,
            expected_version,
        } => store
            .rename(&id, &title, expected_version)
            .map(|_| None)
            .map_err(CommandError::from),
        Request::CompleteReview => store.complete_review().await.map(|_| None),
    };
    match result {
        Ok(data) => Response::success(data),
        Err(e) => Response::failure(e.to_string()),
    }
}

fn encode(view: &DashboardView) -> CommandResult<Value> {
    serde_json::to_value(view).map_err(|e| CommandError::Schema(e.to_string()))
}

// ---------------------------------------------------------------------------
// Client side
// ---------------------------------------------------------------------------

/// Carries one request line to a store and brings back the response line.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: String) -> CommandResult<String>;
}

/// Transport that calls `handle_request` in the same process
pub struct InProcess {
    store: Arc<LocalTaskStore>,
}

impl InProcess {
    pub fn new(store: Arc<LocalTaskStore>) -> Self {
        InProcess { store }
    }
}

#[async_trait]
impl Transport for InProcess {
    async fn round_trip(&self, request: String) -> CommandResult<String> {
        Ok(handle_request(&self.store, &request).await)
    }
}

/// Command interface over a `Transport`. Every response is checked
/// before it is handed to the caller.
pub struct WireClient<T> {
    transport: T,
}

impl<T: Transport> WireClient<T> {
    pub fn new(transport: T) -> Self {
        WireClient { transport }
    }

    async fn call(&self, request: &Request) -> CommandResult<Option<Value>> {
        let line = serde_json::to_string(request)
            .map_err(|e| CommandError::Transport(format!("could not encode request: {}", e)))?;
        let reply = self.transport.round_trip(line).await?;
        let response: Response = serde_json::from_str(&reply)
            .map_err(|e| CommandError::Schema(format!("{} reply: {}", request.name(), e)))?;
        response.into_result()
    }

    async fn call_unit(&self, request: Request) -> CommandResult<()> {
        match self.call(&request).await? {
            None => Ok(()),
            Some(_) => Err(CommandError::Schema(format!(
                "{} returned unexpected data",
                request.name()
            ))),
        }
    }
}

#[async_trait]
impl<T: Transport> TaskCommands for WireClient<T> {
    async fn get_dashboard_data(&self) -> CommandResult<DashboardView> {
        let data = self
            .call(&Request::GetDashboardData)
            .await?
            .ok_or_else(|| CommandError::Schema("dashboard response has no data".into()))?;
        let view: DashboardView =
            serde_json::from_value(data).map_err(|e| CommandError::Schema(e.to_string()))?;
        validate_dashboard(view)
    }

    async fn quick_capture(&self, title: &str) -> CommandResult<()> {
        self.call_unit(Request::QuickCapture {
            title: title.to_string(),
        })
        .await
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> CommandResult<()> {
        self.call_unit(Request::UpdateTaskStatus {
            id: id.to_string(),
            status,
            expected_version: None,
        })
        .await
    }

    async fn delete_task(&self, id: &str) -> CommandResult<()> {
        self.call_unit(Request::DeleteTask { id: id.to_string() }).await
    }

    async fn rename_task(&self, id: &str, title: &str) -> CommandResult<()> {
        self.call_unit(Request::RenameTask {
            id: id.to_string(),
            title: title.to_string(),
            expected_version: None,
        })
        .await
    }

    async fn complete_review(&self) -> CommandResult<()> {
        self.call_unit(Request::CompleteReview).await
    }
}

/// Check a received dashboard: task shape, slot and status agreement,
/// unique IDs, and a single active task. Queue order is re-derived locally.
pub fn validate_dashboard(view: DashboardView) -> CommandResult<DashboardView> {
    let slots: [(&[Task], TaskStatus); 3] = [
        (view.now_task.as_slice(), TaskStatus::Now),
        (&view.next_tasks, TaskStatus::Next),
        (&view.waiting_tasks, TaskStatus::Waiting),
    ];

    let mut seen = HashSet::new();
    for (tasks, status) in slots {
        for task in tasks {
            task.validate()
                .map_err(|e| CommandError::Schema(e.to_string()))?;
            if task.status != status {
                return Err(CommandError::Schema(format!(
                    "task {} is {} but was listed under {}",
                    task.id, task.status, status
                )));
            }
            if !seen.insert(task.id.as_str()) {
                return Err(CommandError::Schema(format!(
                    "task {} appears more than once",
                    task.id
                )));
            }
        }
    }

    project_dashboard(view.tasks(), view.review_due_in_days)
        .map_err(|e| CommandError::Schema(e.to_string()))
}
