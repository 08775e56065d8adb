use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode::display_width;

const NAVIGATE_HINT: &str = "a add  s start  d done  w defer  e edit  R review  q quit";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let (mut spans, hint) = match app.mode {
        Mode::Navigate | Mode::Confirm => (Vec::new(), NAVIGATE_HINT),
        Mode::Capture => (
            prompt_spans(app, "+ ", app.capture.input()),
            "Enter add  Esc cancel",
        ),
        Mode::Rename => (
            prompt_spans(app, "rename: ", &app.rename_input),
            "Enter save  Esc cancel",
        ),
    };

    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if content_width + hint_width + 1 < width {
        let padding = width - content_width - hint_width - 1;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, dim));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// `label` + input + block cursor
fn prompt_spans<'a>(app: &App, label: &'a str, input: &str) -> Vec<Span<'a>> {
    let bg = app.theme.background;
    vec![
        Span::styled(label, Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(
            input.to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
        Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
    ]
}
