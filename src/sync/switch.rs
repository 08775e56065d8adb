use tracing::debug;

use crate::sync::commands::TaskCommands;
use crate::sync::store::{Outcome, SyncStore};

pub const SWITCH_TITLE: &str = "Switch Active Task?";
pub const SWITCH_MESSAGE: &str = "This will move your current NOW task back to the Next list. \
                                  Are you sure you want to switch focus?";
pub const SWITCH_CONFIRM_LABEL: &str = "Switch Task";

/// What a start request turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartDecision {
    /// Nothing was active, so the start was sent right away
    Started(Outcome),
    /// Another task is active; waiting for confirm or cancel
    Pending { candidate: String, active: String },
}

/// Guards starting a task while another one holds the active slot.
///
/// A start request goes straight through only when the last fetched
/// dashboard has no active task. Starting the active task itself is a no-op. Otherwise the candidate is held until the
/// user confirms or cancels.
#[derive(Debug, Clone, Default)]
pub struct SwitchConfirmation {
    pending: Option<String>,
}

impl SwitchConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn holding(candidate: &str) -> Self {
        SwitchConfirmation {
            pending: Some(candidate.to_string()),
        }
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub async fn request_start<C: TaskCommands>(
        &mut self,
        store: &SyncStore<C>,
        id: &str,
    ) -> StartDecision {
        let active = store
            .dashboard()
            .and_then(|d| d.now_task)
            .map(|t| t.id);
        match active {
            Some(active) if active == id => {
                debug!(id, "task is already active");
                StartDecision::Started(Outcome::Skipped)
            }
            None => StartDecision::Started(store.start_task(id).await),
            Some(active) => {
                debug!(candidate = id, %active, "start needs confirmation");
                self.pending = Some(id.to_string());
                StartDecision::Pending {
                    candidate: id.to_string(),
                    active,
                }
            }
        }
    }

    /// Start the held candidate. `None` when nothing was pending.
    pub async fn confirm<C: TaskCommands>(&mut self, store: &SyncStore<C>) -> Option<Outcome> {
        let candidate = self.pending.take()?;
        Some(store.start_task(&candidate).await)
    }

    /// Drop the held candidate without sending anything.
    pub fn cancel(&mut self) -> Option<String> {
        self.pending.take()
    }
}
