mod confirm;
mod edit;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, Mode};

use confirm::handle_confirm;
use edit::{handle_capture, handle_rename};
use navigate::handle_navigate;

/// Something the key press asks the store to do. Pure UI changes
/// (cursor, mode, text entry) are applied directly and produce no action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Refetch; doubles as retry after an error
    Refresh,
    SubmitCapture,
    Start(String),
    ConfirmSwitch,
    CancelSwitch,
    Complete(String),
    Defer(String),
    Delete(String),
    Rename(String, String),
    CompleteReview,
    DismissError,
}

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return None;
    }
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Capture => handle_capture(app, key),
        Mode::Rename => handle_rename(app, key),
        Mode::Confirm => handle_confirm(app, key),
    }
}
