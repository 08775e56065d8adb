use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, warn};

use crate::io::watcher::StoreWatcher;
use crate::model::config::Config;
use crate::model::dashboard::DashboardView;
use crate::model::task::Task;
use crate::sync::capture::CaptureWorkflow;
use crate::sync::commands::TaskCommands;
use crate::sync::store::{Outcome, SyncSnapshot, SyncStore};
use crate::sync::switch::{StartDecision, SwitchConfirmation};

use super::input::{self, Action};
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the capture line
    Capture,
    /// Editing the selected task's title
    Rename,
    /// Switch confirmation popup is open
    Confirm,
}

/// UI state. The dashboard itself is only ever a copy of the store's.
pub struct App {
    pub snapshot: SyncSnapshot,
    pub mode: Mode,
    pub capture: CaptureWorkflow,
    pub switch: SwitchConfirmation,
    pub rename_input: String,
    /// Index into the dashboard's tasks in display order
    pub cursor: usize,
    pub theme: Theme,
    pub confirm_switch: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        App {
            snapshot: SyncSnapshot::default(),
            mode: Mode::Navigate,
            capture: CaptureWorkflow::new(),
            switch: SwitchConfirmation::new(),
            rename_input: String::new(),
            cursor: 0,
            theme: Theme::from_config(&config.ui),
            confirm_switch: config.ui.confirm_switch,
            should_quit: false,
        }
    }

    pub fn dashboard(&self) -> Option<&DashboardView> {
        self.snapshot.dashboard.as_ref()
    }

    pub fn task_count(&self) -> usize {
        self.dashboard().map_or(0, |d| d.tasks().count())
    }

    pub fn selected(&self) -> Option<&Task> {
        self.dashboard()?.tasks().nth(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.task_count();
        if count == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(count - 1);
    }

    /// Copy the store state in and keep the cursor on a real row.
    pub fn sync_from<C: TaskCommands>(&mut self, store: &SyncStore<C>) {
        self.snapshot = store.snapshot();
        self.cursor = self.cursor.min(self.task_count().saturating_sub(1));
    }
}

/// Run one action against the store.
pub async fn perform<C: TaskCommands>(app: &mut App, store: &SyncStore<C>, action: Action) {
    match action {
        Action::Quit => app.should_quit = true,
        Action::Refresh => {
            store.fetch_dashboard().await;
        }
        Action::SubmitCapture => {
            if app.capture.submit(store).await != Outcome::Failed {
                app.mode = Mode::Navigate;
            }
        }
        Action::Start(id) => {
            if let StartDecision::Pending { .. } = app.switch.request_start(store, &id).await {
                if app.confirm_switch {
                    app.mode = Mode::Confirm;
                } else {
                    app.switch.confirm(store).await;
                }
            }
        }
        Action::ConfirmSwitch => {
            app.mode = Mode::Navigate;
            app.switch.confirm(store).await;
        }
        Action::CancelSwitch => {
            app.mode = Mode::Navigate;
            app.switch.cancel();
        }
        Action::Complete(id) => {
            store.complete_task(&id).await;
        }
        Action::Defer(id) => {
            store.defer_task(&id).await;
        }
        Action::Delete(id) => {
            store.delete_task(&id).await;
        }
        Action::Rename(id, title) => {
            if store.rename_task(&id, &title).await != Outcome::Failed {
                app.rename_input.clear();
                app.mode = Mode::Navigate;
            }
        }
        Action::CompleteReview => {
            store.complete_review().await;
        }
        Action::DismissError => store.clear_error(),
    }
    app.sync_from(store);
}

pub async fn run<C: TaskCommands>(
    store: SyncStore<C>,
    config: &Config,
    data_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config);
    store.fetch_dashboard().await;
    app.sync_from(&store);

    let watcher = match StoreWatcher::start(data_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watching unavailable, external edits need a manual refresh");
            None
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal even on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &store, watcher.as_ref()).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop<C: TaskCommands>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &SyncStore<C>,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = input::handle_key(app, key)
        {
            perform(app, store, action).await;
        }

        if app.should_quit {
            break;
        }

        if let Some(watcher) = watcher
            && !watcher.poll().is_empty()
        {
            debug!("store changed on disk, refetching");
            store.fetch_dashboard().await;
            app.sync_from(store);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::commands::CommandError;
    use crate::sync::testing::{ScriptedCommands, view};
    use pretty_assertions::assert_eq;

    async fn app_with(view: DashboardView) -> (App, SyncStore<ScriptedCommands>) {
        let store = SyncStore::new(ScriptedCommands::with_view(view));
        store.fetch_dashboard().await;
        let mut app = App::new(&Config::default());
        app.sync_from(&store);
        (app, store)
    }

    #[tokio::test]
    async fn start_with_active_task_opens_confirmation() {
        let (mut app, store) = app_with(view(Some("3"), &["5"])).await;
        perform(&mut app, &store, Action::Start("5".into())).await;
        assert_eq!(app.mode, Mode::Confirm);
        assert_eq!(app.switch.pending(), Some("5"));
        assert_eq!(store.commands().calls().len(), 1);

        perform(&mut app, &store, Action::ConfirmSwitch).await;
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(store.commands().calls()[1], "update_task_status 5 now");
    }

    #[tokio::test]
    async fn starting_the_active_task_stays_in_navigate() {
        let (mut app, store) = app_with(view(Some("3"), &["5"])).await;
        perform(&mut app, &store, Action::Start("3".into())).await;
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.switch.pending(), None);
        assert_eq!(app.snapshot.error, None);
        assert_eq!(store.commands().calls(), vec!["get_dashboard_data"]);
    }

    #[tokio::test]
    async fn confirmation_can_be_turned_off() {
        let mut config = Config::default();
        config.ui.confirm_switch = false;
        let store = SyncStore::new(ScriptedCommands::with_view(view(Some("3"), &["5"])));
        store.fetch_dashboard().await;
        let mut app = App::new(&config);
        app.sync_from(&store);

        perform(&mut app, &store, Action::Start("5".into())).await;
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(store.commands().calls()[1], "update_task_status 5 now");
    }

    #[tokio::test]
    async fn failure_is_shown_and_dismissable() {
        let (mut app, store) = app_with(view(Some("1"), &[])).await;
        store
            .commands()
            .fail_mutations(CommandError::Rejected("task not found: 1".into()));
        perform(&mut app, &store, Action::Complete("1".into())).await;
        assert_eq!(app.snapshot.error.as_deref(), Some("task not found: 1"));
        assert!(app.snapshot.dashboard.is_some());

        perform(&mut app, &store, Action::DismissError).await;
        assert_eq!(app.snapshot.error, None);
    }

    #[tokio::test]
    async fn cursor_stays_in_range_after_refresh() {
        let (mut app, store) = app_with(view(Some("1"), &["2", "3"])).await;
        app.move_cursor(5);
        assert_eq!(app.cursor, 2);
        store.commands().set_view(view(None, &["2"]));
        perform(&mut app, &store, Action::Refresh).await;
        assert_eq!(app.cursor, 0);
        assert_eq!(app.selected().map(|t| t.id.as_str()), Some("2"));
    }
}
