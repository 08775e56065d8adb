pub mod dashboard_view;
pub mod status_row;
pub mod switch_popup;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::app::{App, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let error_rows = u16::from(app.snapshot.error.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // header
            Constraint::Min(3),             // dashboard panes
            Constraint::Length(error_rows), // inline error notice
            Constraint::Length(1),          // status / input row
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    dashboard_view::render_dashboard_view(frame, app, chunks[1]);
    if error_rows > 0 {
        render_error_line(frame, app, chunks[2]);
    }
    status_row::render_status_row(frame, app, chunks[3]);

    if app.mode == Mode::Confirm {
        switch_popup::render_switch_popup(frame, app, area);
    }
}

/// Title on the left, review countdown and loading marker on the right
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let title = " taskflow";
    let mut right: Vec<Span> = Vec::new();
    if app.snapshot.is_loading {
        right.push(Span::styled(
            "loading\u{2026}  ",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }
    if let Some(dashboard) = app.dashboard() {
        let (text, color) = review_label(dashboard.review_due_in_days);
        let color = match color {
            ReviewTone::Calm => app.theme.dim,
            ReviewTone::Soon => app.theme.yellow,
            ReviewTone::Due => app.theme.red,
        };
        right.push(Span::styled(text, Style::default().fg(color).bg(bg)));
        right.push(Span::styled(" ", Style::default().bg(bg)));
    }

    let mut spans = vec![Span::styled(
        title,
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let right_width: usize = right.iter().map(|s| display_width(&s.content)).sum();
    let used = display_width(title) + right_width;
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        spans.extend(right);
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

enum ReviewTone {
    Calm,
    Soon,
    Due,
}

fn review_label(days: i64) -> (String, ReviewTone) {
    match days {
        d if d < 0 => (format!("review overdue by {}d", -d), ReviewTone::Due),
        0 => ("review due today".to_string(), ReviewTone::Due),
        1 => ("review in 1 day".to_string(), ReviewTone::Soon),
        d => (format!("review in {} days", d), ReviewTone::Calm),
    }
}

/// The last error with its recovery keys. The dashboard above stays as it was.
fn render_error_line(frame: &mut Frame, app: &App, area: Rect) {
    let Some(error) = app.snapshot.error.as_deref() else {
        return;
    };
    let bg = app.theme.background;
    let hint = "  r retry  Esc dismiss ";
    let budget = (area.width as usize).saturating_sub(display_width(hint) + 1);
    let line = Line::from(vec![
        Span::styled(
            format!(" {}", truncate_to_width(error, budget.saturating_sub(1))),
            Style::default().fg(app.theme.red).bg(bg),
        ),
        Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
