//! Scripted command backend for exercising the client-side workflows.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::model::dashboard::DashboardView;
use crate::model::task::{Task, TaskStatus};
use crate::sync::commands::{CommandError, CommandResult, TaskCommands};

type Gate = oneshot::Receiver<CommandResult<DashboardView>>;

/// Records every call. Dashboard fetches resolve immediately with the
/// current view unless a gate was queued, in which case they wait for it.
#[derive(Default)]
pub(crate) struct ScriptedCommands {
    calls: Mutex<Vec<String>>,
    view: Mutex<DashboardView>,
    gates: Mutex<VecDeque<Gate>>,
    mutation_error: Mutex<Option<CommandError>>,
    fetch_error: Mutex<Option<CommandError>>,
}

impl ScriptedCommands {
    pub fn with_view(view: DashboardView) -> Self {
        ScriptedCommands {
            view: Mutex::new(view),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_view(&self, view: DashboardView) {
        *self.view.lock().unwrap() = view;
    }

    /// The next unanswered fetch waits until the returned sender fires.
    pub fn gate_fetch(&self) -> oneshot::Sender<CommandResult<DashboardView>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fail_mutations(&self, err: CommandError) {
        *self.mutation_error.lock().unwrap() = Some(err);
    }

    pub fn fail_fetches(&self, err: CommandError) {
        *self.fetch_error.lock().unwrap() = Some(err);
    }

    pub fn restore_fetches(&self) {
        *self.fetch_error.lock().unwrap() = None;
    }

    fn record(&self, call: String) -> CommandResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.mutation_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskCommands for ScriptedCommands {
    async fn get_dashboard_data(&self) -> CommandResult<DashboardView> {
        self.calls.lock().unwrap().push("get_dashboard_data".into());
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(CommandError::Transport("gate dropped".into())));
        }
        if let Some(err) = self.fetch_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.view.lock().unwrap().clone())
    }

    async fn quick_capture(&self, title: &str) -> CommandResult<()> {
        self.record(format!("quick_capture {}", title))
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> CommandResult<()> {
        self.record(format!("update_task_status {} {}", id, status))
    }

    async fn delete_task(&self, id: &str) -> CommandResult<()> {
        self.record(format!("delete_task {}", id))
    }

    async fn rename_task(&self, id: &str, title: &str) -> CommandResult<()> {
        self.record(format!("rename_task {} {}", id, title))
    }

    async fn complete_review(&self) -> CommandResult<()> {
        self.record("complete_review".into())
    }
}

pub(crate) fn task(id: &str, status: TaskStatus, created_at: i64) -> Task {
    let mut t = Task::new(id.into(), &format!("Task {}", id), created_at).unwrap();
    t.status = status;
    if status == TaskStatus::Done {
        t.completed_at = Some(created_at);
    }
    t
}

/// Dashboard with an optional active task and the given next queue
pub(crate) fn view(now: Option<&str>, next: &[&str]) -> DashboardView {
    DashboardView {
        now_task: now.map(|id| task(id, TaskStatus::Now, 1)),
        next_tasks: next
            .iter()
            .enumerate()
            .map(|(i, id)| task(id, TaskStatus::Next, 10 + i as i64))
            .collect(),
        waiting_tasks: Vec::new(),
        review_due_in_days: 7,
    }
}

/// Yield to the runtime until `done` holds.
pub(crate) async fn until(mut done: impl FnMut() -> bool) {
    while !done() {
        tokio::task::yield_now().await;
    }
}
