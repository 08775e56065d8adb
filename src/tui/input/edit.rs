use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};
use crate::util::unicode::pop_grapheme;

use super::Action;

pub(super) fn handle_capture(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => Some(Action::SubmitCapture),
        KeyCode::Esc => {
            app.capture.clear();
            app.mode = Mode::Navigate;
            None
        }
        KeyCode::Backspace => {
            app.capture.backspace();
            None
        }
        KeyCode::Char(c) => {
            app.capture.push(c);
            None
        }
        _ => None,
    }
}

pub(super) fn handle_rename(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => {
            let title = app.rename_input.trim().to_string();
            let id = app.selected().map(|t| t.id.clone());
            match id {
                Some(id) if !title.is_empty() => Some(Action::Rename(id, title)),
                _ => {
                    app.mode = Mode::Navigate;
                    None
                }
            }
        }
        KeyCode::Esc => {
            app.rename_input.clear();
            app.mode = Mode::Navigate;
            None
        }
        KeyCode::Backspace => {
            pop_grapheme(&mut app.rename_input);
            None
        }
        KeyCode::Char(c) => {
            app.rename_input.push(c);
            None
        }
        _ => None,
    }
}
