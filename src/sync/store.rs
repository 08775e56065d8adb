use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::model::dashboard::DashboardView;
use crate::model::task::TaskStatus;
use crate::sync::commands::{CommandError, TaskCommands};

/// How a store operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was sent, or the response arrived after a newer one
    Skipped,
    /// The call failed; `error` holds the message
    Failed,
    /// The mutation was accepted or the dashboard was replaced
    Applied,
}

/// Point-in-time copy of the store state, for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSnapshot {
    pub dashboard: Option<DashboardView>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct State {
    dashboard: Option<DashboardView>,
    error: Option<String>,
    fetches_in_flight: usize,
    /// Ticket of the newest dashboard response applied so far
    applied_ticket: u64,
}

/// Client-side view of the task store.
///
/// Holds the last fetched dashboard and never edits it locally: every
/// mutation is sent, then the dashboard is fetched again. Failures land in
/// `error` and leave the dashboard as it was.
///
/// Operations may overlap. Each fetch takes a ticket when issued, and a
/// response only replaces the dashboard if no later-issued fetch has
/// already been applied.
pub struct SyncStore<C> {
    commands: C,
    state: Mutex<State>,
    tickets: AtomicU64,
}

impl<C: TaskCommands> SyncStore<C> {
    pub fn new(commands: C) -> Self {
        SyncStore {
            commands,
            state: Mutex::new(State::default()),
            tickets: AtomicU64::new(0),
        }
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let state = self.state();
        SyncSnapshot {
            dashboard: state.dashboard.clone(),
            is_loading: state.fetches_in_flight > 0,
            error: state.error.clone(),
        }
    }

    pub fn dashboard(&self) -> Option<DashboardView> {
        self.state().dashboard.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().fetches_in_flight > 0
    }

    /// Whether the last fetched dashboard has an active task
    pub fn has_active(&self) -> bool {
        self.state()
            .dashboard
            .as_ref()
            .is_some_and(DashboardView::has_active)
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    fn fail(&self, command: &str, err: &CommandError) {
        warn!(command, error = %err, "task command failed");
        self.state().error = Some(err.to_string());
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Load the dashboard. Clears any shown error first; this is also the
    /// retry action.
    pub async fn fetch_dashboard(&self) -> Outcome {
        self.clear_error();
        self.refetch(true).await
    }

    /// Fetch and apply the dashboard unless a later-issued fetch has already
    /// answered. A failure also retires older tickets, so a slow success
    /// cannot replace what the failed newer fetch left on screen.
    ///
    /// With `record_failure` false a fetch error is only logged, leaving
    /// `error` to whoever set it.
    async fn refetch(&self, record_failure: bool) -> Outcome {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        self.state().fetches_in_flight += 1;

        let result = self.commands.get_dashboard_data().await;

        let mut state = self.state();
        state.fetches_in_flight -= 1;
        if ticket <= state.applied_ticket {
            debug!(
                ticket,
                applied = state.applied_ticket,
                ok = result.is_ok(),
                "discarding response from an older fetch"
            );
            return Outcome::Skipped;
        }
        state.applied_ticket = ticket;
        match result {
            Ok(view) => {
                state.dashboard = Some(view);
                debug!(ticket, "dashboard applied");
                Outcome::Applied
            }
            Err(err) => {
                drop(state);
                if record_failure {
                    self.fail("get_dashboard_data", &err);
                } else {
                    warn!(error = %err, "refetch after a failed command also failed");
                }
                Outcome::Failed
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Send one mutation, record its failure, then refetch no matter what.
    /// When the mutation failed, its message is the one that stays in `error`.
    async fn mutate(
        &self,
        command: &'static str,
        call: impl Future<Output = Result<(), CommandError>>,
    ) -> Outcome {
        let outcome = match call.await {
            Ok(()) => {
                info!(command, "task command accepted");
                self.clear_error();
                Outcome::Applied
            }
            Err(err) => {
                self.fail(command, &err);
                Outcome::Failed
            }
        };
        self.refetch(outcome == Outcome::Applied).await;
        outcome
    }

    /// Create a task from capture text. Blank text is dropped without
    /// sending anything.
    pub async fn quick_capture(&self, title: &str) -> Outcome {
        let title = title.trim();
        if title.is_empty() {
            debug!("blank capture ignored");
            return Outcome::Skipped;
        }
        self.mutate("quick_capture", self.commands.quick_capture(title))
            .await
    }

    /// Move a task into the active slot. No confirmation happens here; see
    /// `SwitchConfirmation`.
    pub async fn start_task(&self, id: &str) -> Outcome {
        self.set_status(id, TaskStatus::Now).await
    }

    pub async fn complete_task(&self, id: &str) -> Outcome {
        self.set_status(id, TaskStatus::Done).await
    }

    pub async fn defer_task(&self, id: &str) -> Outcome {
        self.set_status(id, TaskStatus::Waiting).await
    }

    /// Any status change, e.g. shelving a task as `someday`
    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Outcome {
        self.mutate(
            "update_task_status",
            self.commands.update_task_status(id, status),
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> Outcome {
        self.mutate("delete_task", self.commands.delete_task(id))
            .await
    }

    pub async fn rename_task(&self, id: &str, title: &str) -> Outcome {
        self.mutate("rename_task", self.commands.rename_task(id, title))
            .await
    }

    pub async fn complete_review(&self) -> Outcome {
        self.mutate("complete_review", self.commands.complete_review())
            .await
    }
}
