use tracing::{debug, info};

use crate::model::collection::TaskCollection;
use crate::model::config::OnSwitch;
use crate::model::task::{Task, TaskSource, TaskStatus, ValidationError};

/// Error type for task lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task already exists: {0}")]
    DuplicateId(String),
    #[error("cannot move task {id} from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
    #[error("task {active_id} is already active")]
    Conflict { active_id: String },
    #[error("task {id} changed since it was read (expected version {expected}, found {actual})")]
    StaleVersion {
        id: String,
        expected: u64,
        actual: u64,
    },
    #[error("task {0} is done and can no longer be edited")]
    Completed(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// What to do when a task is started while another task is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchPolicy {
    /// Fail with `TransitionError::Conflict`
    #[default]
    Reject,
    /// Move the active task back to `next` as part of the same transition
    DemoteActive,
}

impl From<OnSwitch> for SwitchPolicy {
    fn from(value: OnSwitch) -> Self {
        match value {
            OnSwitch::Demote => SwitchPolicy::DemoteActive,
            OnSwitch::Reject => SwitchPolicy::Reject,
        }
    }
}

/// A requested status change for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub id: String,
    pub to: TaskStatus,
    /// When set, the stored `sync_version` must match or nothing changes
    pub expected_version: Option<u64>,
    pub on_switch: SwitchPolicy,
}

impl TransitionRequest {
    pub fn new(id: impl Into<String>, to: TaskStatus) -> Self {
        TransitionRequest {
            id: id.into(),
            to,
            expected_version: None,
            on_switch: SwitchPolicy::default(),
        }
    }

    pub fn expecting(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }

    pub fn with_policy(mut self, policy: SwitchPolicy) -> Self {
        self.on_switch = policy;
        self
    }
}

/// Result of an applied transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The task after the change
    pub task: Task,
    /// The previously active task, if it was moved back to `next`
    pub demoted: Option<Task>,
}

/// Fields for a task about to be created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub context: Option<String>,
    pub scheduled_for: Option<i64>,
    pub original_input: Option<String>,
    pub source: TaskSource,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Insert a new `next` task under the given ID.
pub fn create_task<'a>(
    collection: &'a mut TaskCollection,
    id: String,
    new: NewTask,
    now: i64,
) -> Result<&'a Task, TransitionError> {
    if collection.contains(&id) {
        return Err(TransitionError::DuplicateId(id));
    }
    let mut task = Task::new(id.clone(), &new.title, now)?;
    task.context = new.context;
    task.scheduled_for = new.scheduled_for;
    task.original_input = new.original_input;
    task.source = new.source;
    task.tags = new.tags;
    collection.insert(task);
    info!(task_id = %id, "task created");
    collection
        .get(&id)
        .ok_or(TransitionError::NotFound(id))
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Validate and apply a status change.
///
/// Every check runs before anything is written, so a failed request leaves
/// the collection untouched. Starting a task while another is active either
/// fails or demotes the other task, per `request.on_switch`.
pub fn apply_status(
    collection: &mut TaskCollection,
    request: &TransitionRequest,
    now: i64,
) -> Result<TransitionOutcome, TransitionError> {
    let current = collection
        .get(&request.id)
        .ok_or_else(|| TransitionError::NotFound(request.id.clone()))?;
    check_version(current, request.expected_version)?;

    if !current.status.can_transition_to(request.to) {
        return Err(TransitionError::InvalidTransition {
            id: request.id.clone(),
            from: current.status,
            to: request.to,
        });
    }

    let displaced = if request.to == TaskStatus::Now {
        collection
            .active_ids()
            .into_iter()
            .find(|id| *id != request.id)
    } else {
        None
    };

    let demote_id = match (displaced, request.on_switch) {
        (Some(active_id), SwitchPolicy::Reject) => {
            debug!(task_id = %request.id, %active_id, "start rejected, another task is active");
            return Err(TransitionError::Conflict { active_id });
        }
        (Some(active_id), SwitchPolicy::DemoteActive) => Some(active_id),
        (None, _) => None,
    };

    let demoted = match demote_id {
        Some(active_id) => {
            let active = collection
                .get_mut(&active_id)
                .ok_or_else(|| TransitionError::NotFound(active_id.clone()))?;
            set_status(active, TaskStatus::Next, now);
            info!(task_id = %active_id, "active task demoted to next");
            Some(active.clone())
        }
        None => None,
    };

    let task = collection
        .get_mut(&request.id)
        .ok_or_else(|| TransitionError::NotFound(request.id.clone()))?;
    let from = task.status;
    set_status(task, request.to, now);
    info!(
        task_id = %request.id,
        %from,
        to = %request.to,
        sync_version = task.sync_version,
        "task status changed"
    );

    Ok(TransitionOutcome {
        task: task.clone(),
        demoted,
    })
}

/// Direct status write with completion bookkeeping
fn set_status(task: &mut Task, status: TaskStatus, now: i64) {
    task.status = status;
    task.touch(now);
    task.completed_at = if status == TaskStatus::Done {
        Some(task.updated_at)
    } else {
        None
    };
}

fn check_version(task: &Task, expected: Option<u64>) -> Result<(), TransitionError> {
    match expected {
        Some(expected) if expected != task.sync_version => Err(TransitionError::StaleVersion {
            id: task.id.clone(),
            expected,
            actual: task.sync_version,
        }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Edit and removal
// ---------------------------------------------------------------------------

/// Change a task's title in place. ID, status and capture text are kept.
pub fn rename_task<'a>(
    collection: &'a mut TaskCollection,
    id: &str,
    title: &str,
    expected_version: Option<u64>,
    now: i64,
) -> Result<&'a Task, TransitionError> {
    let title = title.trim();
    let task = collection
        .get_mut(id)
        .ok_or_else(|| TransitionError::NotFound(id.to_string()))?;
    check_version(task, expected_version)?;
    if task.status.is_terminal() {
        return Err(TransitionError::Completed(id.to_string()));
    }
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    if task.title != title {
        task.title = title.to_string();
        task.touch(now);
        info!(task_id = %id, sync_version = task.sync_version, "task renamed");
    }
    Ok(&*task)
}

/// Remove a task entirely. Returns the removed task.
pub fn delete_task(collection: &mut TaskCollection, id: &str) -> Result<Task, TransitionError> {
    let removed = collection
        .remove(id)
        .ok_or_else(|| TransitionError::NotFound(id.to_string()))?;
    info!(task_id = %id, "task deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(id: &str, status: TaskStatus) -> Task {
        let mut t = Task::new(id.into(), &format!("Task {}", id), 100).unwrap();
        t.status = status;
        if status == TaskStatus::Done {
            t.completed_at = Some(150);
        }
        t
    }

    fn collection(tasks: Vec<Task>) -> TaskCollection {
        TaskCollection::from_tasks(tasks).unwrap()
    }

    #[test]
    fn create_defaults_to_next() {
        let mut c = TaskCollection::new();
        let created = create_task(
            &mut c,
            "t1".into(),
            NewTask {
                title: " Buy milk ".into(),
                context: Some("errands".into()),
                original_input: Some("Buy milk @errands".into()),
                ..Default::default()
            },
            500,
        )
        .unwrap();
        assert_eq!(created.status, TaskStatus::Next);
        assert_eq!(created.title, "Buy milk");
        assert_eq!(created.context.as_deref(), Some("errands"));
        assert_eq!(created.original_input.as_deref(), Some("Buy milk @errands"));
        assert_eq!(created.sync_version, 1);
    }

    #[test]
    fn create_rejects_blank_title_and_duplicates() {
        let mut c = collection(vec![task("t1", TaskStatus::Next)]);
        assert_eq!(
            create_task(&mut c, "t2".into(), NewTask::titled("  "), 1).unwrap_err(),
            TransitionError::Validation(ValidationError::EmptyTitle)
        );
        assert_eq!(
            create_task(&mut c, "t1".into(), NewTask::titled("again"), 1).unwrap_err(),
            TransitionError::DuplicateId("t1".into())
        );
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn complete_active_task() {
        let mut c = collection(vec![task("7", TaskStatus::Now)]);
        let outcome = apply_status(&mut c, &TransitionRequest::new("7", TaskStatus::Done), 900).unwrap();
        assert_eq!(outcome.task.status, TaskStatus::Done);
        assert_eq!(outcome.task.completed_at, Some(900));
        assert_eq!(outcome.task.sync_version, 2);
        assert_eq!(outcome.task.updated_at, 900);
        assert!(outcome.demoted.is_none());
        assert!(c.active_ids().is_empty());
    }

    #[test]
    fn start_next_task_when_none_active() {
        let mut c = collection(vec![task("1", TaskStatus::Next)]);
        let outcome = apply_status(&mut c, &TransitionRequest::new("1", TaskStatus::Now), 200).unwrap();
        assert_eq!(outcome.task.status, TaskStatus::Now);
        assert_eq!(c.active_ids(), vec!["1".to_string()]);
    }

    #[test]
    fn start_while_active_is_rejected_without_mutation() {
        let mut c = collection(vec![task("3", TaskStatus::Now), task("5", TaskStatus::Next)]);
        let before = c.clone();
        let err = apply_status(&mut c, &TransitionRequest::new("5", TaskStatus::Now), 200).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Conflict {
                active_id: "3".into()
            }
        );
        assert_eq!(c, before);
    }

    #[test]
    fn start_while_active_demotes_atomically() {
        let mut c = collection(vec![task("3", TaskStatus::Now), task("5", TaskStatus::Next)]);
        let request = TransitionRequest::new("5", TaskStatus::Now).with_policy(SwitchPolicy::DemoteActive);
        let outcome = apply_status(&mut c, &request, 200).unwrap();

        let demoted = outcome.demoted.unwrap();
        assert_eq!(demoted.id, "3");
        assert_eq!(demoted.status, TaskStatus::Next);
        assert_eq!(demoted.sync_version, 2);
        assert_eq!(outcome.task.status, TaskStatus::Now);
        assert_eq!(c.active_ids(), vec!["5".to_string()]);
        assert_eq!(c.get("3").unwrap().status, TaskStatus::Next);
    }

    #[test]
    fn done_is_final() {
        for to in TaskStatus::ALL {
            let mut c = collection(vec![task("d", TaskStatus::Done)]);
            let before = c.clone();
            let err = apply_status(&mut c, &TransitionRequest::new("d", to), 300).unwrap_err();
            assert!(matches!(err, TransitionError::InvalidTransition { .. }));
            assert_eq!(c, before);
        }
    }

    #[test]
    fn same_status_is_not_a_transition() {
        let mut c = collection(vec![task("1", TaskStatus::Waiting)]);
        let err = apply_status(&mut c, &TransitionRequest::new("1", TaskStatus::Waiting), 300).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                id: "1".into(),
                from: TaskStatus::Waiting,
                to: TaskStatus::Waiting
            }
        );
    }

    #[test]
    fn defer_active_task() {
        let mut c = collection(vec![task("1", TaskStatus::Now)]);
        let outcome = apply_status(&mut c, &TransitionRequest::new("1", TaskStatus::Waiting), 300).unwrap();
        assert_eq!(outcome.task.status, TaskStatus::Waiting);
        assert!(outcome.task.completed_at.is_none());
    }

    #[test]
    fn unknown_task_is_not_found() {
        let mut c = TaskCollection::new();
        assert_eq!(
            apply_status(&mut c, &TransitionRequest::new("nope", TaskStatus::Now), 1).unwrap_err(),
            TransitionError::NotFound("nope".into())
        );
    }

    #[test]
    fn stale_version_is_rejected() {
        let mut c = collection(vec![task("1", TaskStatus::Next)]);
        let request = TransitionRequest::new("1", TaskStatus::Now).expecting(4);
        assert_eq!(
            apply_status(&mut c, &request, 1).unwrap_err(),
            TransitionError::StaleVersion {
                id: "1".into(),
                expected: 4,
                actual: 1
            }
        );

        let request = TransitionRequest::new("1", TaskStatus::Now).expecting(1);
        assert!(apply_status(&mut c, &request, 1).is_ok());
    }

    #[test]
    fn rename_keeps_identity_and_history() {
        let mut t = task("1", TaskStatus::Now);
        t.original_input = Some("draft thing tomorrow".into());
        let mut c = collection(vec![t]);
        let renamed = rename_task(&mut c, "1", "Draft the proposal", Some(1), 400).unwrap();
        assert_eq!(renamed.id, "1");
        assert_eq!(renamed.title, "Draft the proposal");
        assert_eq!(renamed.status, TaskStatus::Now);
        assert_eq!(renamed.sync_version, 2);
        assert_eq!(renamed.updated_at, 400);
        assert_eq!(renamed.original_input.as_deref(), Some("draft thing tomorrow"));
    }

    #[test]
    fn rename_rejects_done_and_blank() {
        let mut c = collection(vec![task("d", TaskStatus::Done), task("n", TaskStatus::Next)]);
        assert_eq!(
            rename_task(&mut c, "d", "x", None, 1).unwrap_err(),
            TransitionError::Completed("d".into())
        );
        assert_eq!(
            rename_task(&mut c, "n", "   ", None, 1).unwrap_err(),
            TransitionError::Validation(ValidationError::EmptyTitle)
        );
        assert_eq!(c.get("n").unwrap().sync_version, 1);
    }

    #[test]
    fn delete_removes_any_task() {
        let mut c = collection(vec![task("d", TaskStatus::Done), task("n", TaskStatus::Now)]);
        assert_eq!(delete_task(&mut c, "d").unwrap().id, "d");
        assert_eq!(delete_task(&mut c, "n").unwrap().id, "n");
        assert!(c.is_empty());
        assert_eq!(
            delete_task(&mut c, "n").unwrap_err(),
            TransitionError::NotFound("n".into())
        );
    }
}
