use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::task::Task;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the Now / Next / Waiting panes
pub fn render_dashboard_view(frame: &mut Frame, app: &App, area: Rect) {
    let Some(dashboard) = app.dashboard() else {
        let msg = Paragraph::new(Line::from(Span::styled(
            " Loading dashboard\u{2026}",
            Style::default().fg(app.theme.dim).bg(app.theme.background),
        )));
        frame.render_widget(msg, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Percentage(35),
        ])
        .split(area);

    // Rows are numbered across panes in display order, matching App::cursor
    let now: Vec<&Task> = dashboard.now_task.iter().collect();
    let next: Vec<&Task> = dashboard.next_tasks.iter().collect();
    let waiting: Vec<&Task> = dashboard.waiting_tasks.iter().collect();
    let next_offset = now.len();
    let waiting_offset = next_offset + next.len();

    render_pane(frame, app, chunks[0], "Now", &now, 0, "Nothing in focus");
    render_pane(
        frame,
        app,
        chunks[1],
        &format!("Next ({})", next.len()),
        &next,
        next_offset,
        "Queue is empty. Press a to capture.",
    );
    render_pane(
        frame,
        app,
        chunks[2],
        &format!("Waiting ({})", waiting.len()),
        &waiting,
        waiting_offset,
        "Nothing waiting",
    );
}

fn render_pane(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    tasks: &[&Task],
    first_index: usize,
    empty_text: &str,
) {
    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if tasks.is_empty() {
        let line = Line::from(Span::styled(
            format!(" {}", empty_text),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        frame.render_widget(Paragraph::new(line), inner);
        return;
    }

    let visible = inner.height as usize;
    let selected = app
        .cursor
        .checked_sub(first_index)
        .filter(|&i| i < tasks.len());
    // Keep the selected row on screen
    let skip = match selected {
        Some(i) if visible > 0 && i >= visible => i + 1 - visible,
        _ => 0,
    };

    let lines: Vec<Line> = tasks
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(i, task)| task_line(app, task, selected == Some(i), inner.width as usize))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

/// One task row: title, then context and tags dimmed
fn task_line<'a>(app: &App, task: &'a Task, selected: bool, width: usize) -> Line<'a> {
    let bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let marker = if selected { "\u{25B8} " } else { "  " };

    let mut suffix = String::new();
    if let Some(context) = &task.context {
        suffix.push_str(&format!(" @{}", context));
    }
    for tag in &task.tags {
        suffix.push_str(&format!(" #{}", tag));
    }

    let title_budget = width
        .saturating_sub(display_width(marker) + display_width(&suffix))
        .max(1);
    let title = truncate_to_width(&task.title, title_budget);
    let used = display_width(marker) + display_width(&title) + display_width(&suffix);

    let mut title_style = Style::default().fg(app.theme.status_color(task.status)).bg(bg);
    if selected {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::styled(marker, Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(title, title_style),
        Span::styled(suffix, Style::default().fg(app.theme.dim).bg(bg)),
    ];
    if selected && used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
    }
    Line::from(spans)
}
