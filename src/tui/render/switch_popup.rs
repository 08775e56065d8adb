use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::sync::switch::{SWITCH_CONFIRM_LABEL, SWITCH_MESSAGE, SWITCH_TITLE};
use crate::tui::app::App;

/// Render the "switch active task" confirmation popup
pub fn render_switch_popup(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let highlight = app.theme.highlight;

    let header_style = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let bright_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let popup_w: u16 = 52.min(area.width.saturating_sub(2));

    let dashboard = app.dashboard();
    let active = dashboard.and_then(|d| d.now_task.as_ref());
    let candidate = app
        .switch
        .pending()
        .and_then(|id| dashboard.and_then(|d| d.find(id)));

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(format!(" {}", SWITCH_TITLE), header_style)),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", SWITCH_MESSAGE), text_style)),
        Line::from(""),
    ];
    if let (Some(active), Some(candidate)) = (active, candidate) {
        lines.push(Line::from(vec![
            Span::styled("  now   ", dim_style),
            Span::styled(active.title.as_str(), text_style),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  start ", dim_style),
            Span::styled(candidate.title.as_str(), bright_style),
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("  y", dim_style),
        Span::styled(format!(" {}  ", SWITCH_CONFIRM_LABEL), text_style),
        Span::styled("Esc", dim_style),
        Span::styled(" cancel", text_style),
    ]));

    // Message wraps to about two extra rows
    let popup_h = ((lines.len() as u16) + 4).min(area.height.saturating_sub(2));

    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(highlight).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
