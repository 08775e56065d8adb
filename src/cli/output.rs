use chrono::DateTime;
use serde::Serialize;

use crate::model::dashboard::DashboardView;
use crate::model::task::{Task, TaskStatus};

/// Characters of an ID shown in listings
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub tasks: Vec<&'a Task>,
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

pub fn status_char(status: TaskStatus) -> char {
    match status {
        TaskStatus::Now => '>',
        TaskStatus::Next => ' ',
        TaskStatus::Waiting => '-',
        TaskStatus::Someday => '~',
        TaskStatus::Done => 'x',
    }
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn format_day(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// One-line summary: `[>] 1a2b3c4d Title @context #tag (due 2025-05-15)`
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {}",
        status_char(task.status),
        short_id(&task.id),
        task.title
    );
    if let Some(context) = &task.context {
        line.push_str(&format!(" @{}", context));
    }
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    if let Some(at) = task.scheduled_for {
        line.push_str(&format!(" (due {})", format_day(at)));
    }
    line
}

pub fn format_review(days: i64) -> String {
    match days {
        d if d < 0 => format!("review overdue by {} day{}", -d, plural(-d)),
        0 => "review due today".to_string(),
        d => format!("review due in {} day{}", d, plural(d)),
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

pub fn format_dashboard(view: &DashboardView) -> Vec<String> {
    let mut lines = vec!["== Now ==".to_string()];
    match &view.now_task {
        Some(task) => lines.push(format_task_line(task)),
        None => lines.push("(nothing active)".to_string()),
    }

    for (heading, tasks) in [("Next", &view.next_tasks), ("Waiting", &view.waiting_tasks)] {
        lines.push(String::new());
        lines.push(format!("== {} ({}) ==", heading, tasks.len()));
        lines.extend(tasks.iter().map(format_task_line));
    }

    lines.push(String::new());
    lines.push(format_review(view.review_due_in_days));
    lines
}

/// Parse a status argument
pub fn parse_status_arg(s: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse_status(s).ok_or_else(|| {
        format!(
            "unknown status '{}' (expected: now, next, waiting, someday, done)",
            s
        )
    })
}
