use crate::model::dashboard::DashboardView;
use crate::model::task::{Task, TaskStatus};

/// Error type for dashboard projection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("invariant violation: more than one active task ({})", .ids.join(", "))]
    InvariantViolation { ids: Vec<String> },
}

/// Derive the dashboard from an unordered task collection.
///
/// The single `now` task fills the active slot; `next` and `waiting` tasks
/// are queued oldest first. `someday` and `done` tasks are left out.
/// `review_due_in_days` is passed through untouched. Ties on `created_at`
/// break on task ID so the result never depends on input order.
pub fn project_dashboard<'a, I>(
    tasks: I,
    review_due_in_days: i64,
) -> Result<DashboardView, ProjectionError>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut active: Vec<&Task> = Vec::new();
    let mut next_tasks = Vec::new();
    let mut waiting_tasks = Vec::new();

    for task in tasks {
        match task.status {
            TaskStatus::Now => active.push(task),
            TaskStatus::Next => next_tasks.push(task.clone()),
            TaskStatus::Waiting => waiting_tasks.push(task.clone()),
            TaskStatus::Someday | TaskStatus::Done => {}
        }
    }

    if active.len() > 1 {
        let mut ids: Vec<String> = active.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        return Err(ProjectionError::InvariantViolation { ids });
    }

    sort_queue(&mut next_tasks);
    sort_queue(&mut waiting_tasks);

    Ok(DashboardView {
        now_task: active.pop().cloned(),
        next_tasks,
        waiting_tasks,
        review_due_in_days,
    })
}

fn sort_queue(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
