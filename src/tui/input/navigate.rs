use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};

use super::Action;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) -> Option<Action> {
    let selected = app.selected().map(|t| t.id.clone());
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            Some(Action::Quit)
        }
        (_, KeyCode::Esc) if app.snapshot.error.is_some() => Some(Action::DismissError),

        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => {
            app.move_cursor(1);
            None
        }
        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => {
            app.move_cursor(-1);
            None
        }
        (_, KeyCode::Char('g')) | (_, KeyCode::Home) => {
            app.cursor = 0;
            None
        }
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => {
            app.cursor = app.task_count().saturating_sub(1);
            None
        }

        (_, KeyCode::Char('a')) | (_, KeyCode::Char('c')) => {
            app.mode = Mode::Capture;
            None
        }
        (_, KeyCode::Char('e')) => {
            let title = app.selected()?.title.clone();
            app.rename_input = title;
            app.mode = Mode::Rename;
            None
        }
        (_, KeyCode::Char('r')) => Some(Action::Refresh),
        (_, KeyCode::Char('R')) => Some(Action::CompleteReview),

        (_, KeyCode::Enter) | (_, KeyCode::Char('s')) => selected.map(Action::Start),
        (_, KeyCode::Char('d')) => selected.map(Action::Complete),
        (_, KeyCode::Char('w')) => selected.map(Action::Defer),
        (_, KeyCode::Char('X')) => selected.map(Action::Delete),
        _ => None,
    }
}
