use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

use super::Action;

/// Switch confirmation popup. Everything other than a decision is swallowed.
pub(super) fn handle_confirm(_app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Some(Action::ConfirmSwitch),
        KeyCode::Char('n') | KeyCode::Esc => Some(Action::CancelSwitch),
        _ => None,
    }
}
