//! Terminal User Interface for Trendboard.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
mod ui;
pub mod widgets;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::app::Dashboard;
use crate::error::{BoardError, Result};
use app::Action;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| BoardError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .map_err(|e| BoardError::internal(format!("Failed to enter alternate screen: {e}")))?;

        Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| BoardError::internal(format!("Failed to create terminal: {e}")))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| BoardError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        )
            .map_err(|e| BoardError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| BoardError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the event loop until the user quits.
    ///
    /// Each action is awaited before the next key is read. Without a
    /// dashboard only the blocking error screen can be shown.
    pub async fn run(&mut self, app: &mut App, dashboard: Option<&Dashboard>) -> Result<()> {
        let restore_hook = install_panic_hook();
        let result = self.run_event_loop(app, dashboard).await;
        restore_hook();
        result
    }

    async fn run_event_loop(&mut self, app: &mut App, dashboard: Option<&Dashboard>) -> Result<()> {
        loop {
            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| BoardError::internal(format!("Failed to draw: {e}")))?;

            if !app.running {
                break;
            }

            let handler = self.event_handler;
            let event = tokio::task::spawn_blocking(move || handler.next())
                .await
                .map_err(|e| BoardError::internal(format!("Event task failed: {e}")))??;

            let action = match event {
                Event::Key(key) => app.handle_key(key),
                Event::Paste(text) => {
                    app.handle_paste(&text);
                    None
                }
                Event::Resize(..) | Event::Tick => None,
            };

            if let Some(action) = action {
                match dashboard {
                    Some(dashboard) => dispatch(app, dashboard, action).await,
                    None => warn!("Ignoring {:?} without a store", action),
                }
            }
        }

        Ok(())
    }
}

/// Installs a panic hook that restores the terminal before the previous
/// hook runs. The returned closure reinstates the previous hook.
fn install_panic_hook() -> impl FnOnce() {
    let previous = Arc::new(panic::take_hook());
    let chained = Arc::clone(&previous);
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        chained(panic_info);
    }));

    move || panic::set_hook(Box::new(move |panic_info| previous(panic_info)))
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Performs an action against the dashboard and feeds the result to the app.
///
/// Loading the country list chains into loading the first country.
pub async fn dispatch(app: &mut App, dashboard: &Dashboard, action: Action) {
    let mut next = Some(action);

    while let Some(action) = next.take() {
        debug!(?action, "Dispatching action");

        next = match action {
            Action::LoadReport(report) => {
                match dashboard.report(report).await {
                    Ok(view) => app.show_view(view),
                    Err(e) => {
                        error!("Failed to load {}: {}", report, e);
                        app.show_error(&e);
                    }
                }
                None
            }
            Action::LoadCountries => match dashboard.countries().await {
                Ok(countries) => app.show_countries(countries),
                Err(e) => {
                    error!("Failed to load countries: {}", e);
                    app.show_error(&e);
                    None
                }
            },
            Action::LoadRegional(country) => {
                match dashboard.regional_trends(&country).await {
                    Ok(view) => app.show_view(view),
                    Err(e) => {
                        error!("Failed to load trends for {}: {}", country, e);
                        app.show_error(&e);
                    }
                }
                None
            }
            Action::RunQuery(sql) => {
                if let Some(session) = app.session().copied() {
                    let outcome = dashboard.run_query(&session, &sql).await;
                    app.show_outcome(&outcome);
                }
                None
            }
        };
    }
}

/// Runs the TUI until the user quits, then closes the store.
pub async fn run(mut app: App, dashboard: Option<Dashboard>) -> Result<()> {
    let mut tui = Tui::new()?;
    let result = tui.run(&mut app, dashboard.as_ref()).await;

    if let Some(dashboard) = dashboard {
        if let Err(e) = dashboard.close().await {
            warn!("Error closing database connection: {}", e);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Notice;
    use crate::db::Value;
    use crate::session::AdminSecret;
    use app::Page;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn logged_in_app(admin: bool) -> App {
        let mut app = App::new("demo", Some(AdminSecret::new("pw")));
        if admin {
            app.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
            app.handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE));
            app.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE));
        }
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        app
    }

    #[tokio::test]
    async fn test_dispatch_report() {
        let dashboard = Dashboard::with_demo_data();
        let mut app = logged_in_app(false);

        let action = app.open_page(Page::TopSongs).unwrap();
        dispatch(&mut app, &dashboard, action).await;

        let view = app.view.unwrap();
        assert_eq!(view.table.columns, vec!["Song", "Total Popularity"]);
        assert!(view.chart.is_some());
    }

    #[tokio::test]
    async fn test_dispatch_countries_loads_first_country() {
        let dashboard = Dashboard::with_demo_data();
        let mut app = logged_in_app(false);

        let action = app.open_page(Page::RegionalTrends).unwrap();
        dispatch(&mut app, &dashboard, action).await;

        assert_eq!(app.countries.len(), 5);
        let view = app.view.unwrap();
        // Brazil is first alphabetically.
        assert_eq!(view.table.records[0][0], Value::from("Tití Me Preguntó"));
    }

    #[tokio::test]
    async fn test_dispatch_query_respects_role() {
        let dashboard = Dashboard::with_demo_data();

        let mut analyst = logged_in_app(false);
        dispatch(
            &mut analyst,
            &dashboard,
            Action::RunQuery("DELETE FROM songs".into()),
        )
        .await;
        assert_eq!(
            analyst.notice,
            Some(Notice::Error(
                "restricted role: only read queries permitted".into()
            ))
        );

        let mut admin = logged_in_app(true);
        dispatch(
            &mut admin,
            &dashboard,
            Action::RunQuery("DELETE FROM songs".into()),
        )
        .await;
        assert_eq!(
            admin.notice,
            Some(Notice::Success("Query executed successfully!".into()))
        );
    }

    #[test]
    fn test_panic_hook_hands_back_previous_hook() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let saved = panic::take_hook();
        panic::set_hook(Box::new(|_| {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }));

        let restore = install_panic_hook();
        let _ = panic::catch_unwind(|| panic!("while drawing"));
        let during = CALLS.load(Ordering::SeqCst);

        restore();
        let _ = panic::catch_unwind(|| panic!("after leaving"));
        let after = CALLS.load(Ordering::SeqCst);

        panic::set_hook(saved);

        assert!(during >= 1);
        assert!(after > during);
    }
}
