//! Application state for the TUI.
//!
//! Key handling is synchronous: it updates state and may return an [`Action`]
//! that needs the store. The event loop performs the action and feeds the
//! result back through the `show_*` methods.

use crate::app::{outcome_view, Notice};
use crate::error::BoardError;
use crate::gate::{QueryOutcome, Role};
use crate::reports::{Report, ReportView};
use crate::session::{AdminSecret, RoleChoice, Session};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Hint shown above the editor for restricted sessions.
pub const READ_ONLY_HINT: &str = "read-only session: only SELECT queries are permitted";

/// Hint shown above the editor for privileged sessions.
pub const ADMIN_HINT: &str = "You can run any SQL query. (Be careful: this can modify data!)";

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Menu,
    Content,
}

impl Focus {
    /// Switches to the other panel.
    pub fn next(self) -> Self {
        match self {
            Self::Menu => Self::Content,
            Self::Content => Self::Menu,
        }
    }
}

/// A dashboard page, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    TopSongs,
    PopularArtists,
    RegionalTrends,
    CustomQuery,
}

impl Page {
    /// All pages in menu order.
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::TopSongs,
        Page::PopularArtists,
        Page::RegionalTrends,
        Page::CustomQuery,
    ];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::TopSongs => "Top Songs",
            Self::PopularArtists => "Popular Artists",
            Self::RegionalTrends => "Regional Trends",
            Self::CustomQuery => "Custom SQL Query",
        }
    }

    /// Page heading.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Welcome!",
            Self::TopSongs => Report::TopSongs.title(),
            Self::PopularArtists => Report::PopularArtists.title(),
            Self::RegionalTrends => Report::RegionalTrends.title(),
            Self::CustomQuery => "Run Your Own SQL Query",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    fn previous(self) -> Self {
        let i = self.index();
        Self::ALL[if i == 0 { Self::ALL.len() - 1 } else { i - 1 }]
    }

    fn following(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The action that fills this page when it is opened.
    fn load_action(self) -> Option<Action> {
        match self {
            Self::TopSongs => Some(Action::LoadReport(Report::TopSongs)),
            Self::PopularArtists => Some(Action::LoadReport(Report::PopularArtists)),
            Self::RegionalTrends => Some(Action::LoadCountries),
            Self::Home | Self::CustomQuery => None,
        }
    }
}

/// Work that needs the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadReport(Report),
    LoadCountries,
    LoadRegional(String),
    RunQuery(String),
}

/// Single-line text input with a character-indexed cursor.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (character index).
    pub cursor: usize,
}

impl InputState {
    /// Creates a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Moves the cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor to the start of the input.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the end of the input.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Clears the input.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Returns true if the input is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Applies a common editing key. Returns false if the key is not an edit.
    fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }
}

/// State of the login form.
#[derive(Debug, Default)]
pub struct LoginState {
    /// Requested role.
    pub choice: RoleChoice,
    /// Admin password, shown masked.
    pub password: InputState,
}

/// What the terminal is showing.
#[derive(Debug)]
pub enum Screen {
    Login(LoginState),
    Dashboard,
    /// The store could not be reached; only quitting is possible.
    Blocked(String),
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    /// Current screen.
    pub screen: Screen,
    /// Current focus panel.
    pub focus: Focus,
    /// Selected page.
    pub page: Page,
    /// Database connection info for display.
    pub connection_info: String,
    /// Custom query editor.
    pub editor: InputState,
    /// Countries for the regional page.
    pub countries: Vec<String>,
    /// Highlighted country.
    pub country_index: usize,
    /// Content currently shown on the page.
    pub view: Option<ReportView>,
    /// Records scrolled past in the content table.
    pub table_scroll: usize,
    /// One-line message for the user.
    pub notice: Option<Notice>,
    session: Option<Session>,
    admin_secret: Option<AdminSecret>,
}

impl App {
    /// Creates an App showing the login screen.
    pub fn new(connection_info: impl Into<String>, admin_secret: Option<AdminSecret>) -> Self {
        Self {
            running: true,
            screen: Screen::Login(LoginState::default()),
            focus: Focus::default(),
            page: Page::default(),
            connection_info: connection_info.into(),
            editor: InputState::new(),
            countries: Vec::new(),
            country_index: 0,
            view: None,
            table_scroll: 0,
            notice: None,
            session: None,
            admin_secret,
        }
    }

    /// Creates an App that only shows a blocking error.
    pub fn blocked(connection_info: impl Into<String>, message: impl Into<String>) -> Self {
        let mut app = Self::new(connection_info, None);
        app.screen = Screen::Blocked(message.into());
        app
    }

    /// Returns the session role once logged in.
    pub fn role(&self) -> Option<Role> {
        self.session.map(|s| s.role())
    }

    /// Returns the editor hint for the current role.
    pub fn query_hint(&self) -> &'static str {
        match self.role() {
            Some(Role::Privileged) => ADMIN_HINT,
            _ => READ_ONLY_HINT,
        }
    }

    /// Handles a key press. Returns work for the event loop, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return None;
        }

        match &mut self.screen {
            Screen::Blocked(_) => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter) {
                    self.running = false;
                }
                None
            }
            Screen::Login(login) => {
                match key.code {
                    KeyCode::Esc => self.running = false,
                    KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                        login.choice = login.choice.toggle();
                    }
                    KeyCode::Enter => self.finish_login(),
                    _ if login.choice == RoleChoice::Admin => {
                        login.password.handle_edit_key(key);
                    }
                    _ => {}
                }
                None
            }
            Screen::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn finish_login(&mut self) {
        let Screen::Login(login) = &self.screen else {
            return;
        };

        let supplied = match login.choice {
            RoleChoice::Admin => Some(login.password.text.as_str()),
            RoleChoice::Analyst => None,
        };
        let start = Session::start(login.choice, supplied, self.admin_secret.as_ref());

        self.session = Some(start.session);
        self.notice = start.warning.map(|w| Notice::Error(w.to_string()));
        self.screen = Screen::Dashboard;
        self.focus = Focus::Menu;
        self.page = Page::Home;
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Tab {
            self.focus = self.focus.next();
            return None;
        }

        match self.focus {
            Focus::Menu => self.handle_menu_key(key),
            Focus::Content => self.handle_content_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.running = false;
                None
            }
            KeyCode::Up => self.open_page(self.page.previous()),
            KeyCode::Down => self.open_page(self.page.following()),
            KeyCode::Enter | KeyCode::Right => {
                self.focus = Focus::Content;
                None
            }
            _ => None,
        }
    }

    /// Switches page and returns the action that loads it.
    pub fn open_page(&mut self, page: Page) -> Option<Action> {
        self.page = page;
        self.view = None;
        self.table_scroll = 0;
        self.notice = None;
        self.countries.clear();
        self.country_index = 0;
        page.load_action()
    }

    fn handle_content_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Esc {
            self.focus = Focus::Menu;
            return None;
        }

        match self.page {
            Page::Home => None,
            Page::TopSongs | Page::PopularArtists => {
                self.scroll_table(key.code);
                None
            }
            Page::RegionalTrends => match key.code {
                KeyCode::Up => {
                    self.country_index = self.country_index.saturating_sub(1);
                    None
                }
                KeyCode::Down => {
                    if self.country_index + 1 < self.countries.len() {
                        self.country_index += 1;
                    }
                    None
                }
                KeyCode::Enter => self
                    .countries
                    .get(self.country_index)
                    .cloned()
                    .map(Action::LoadRegional),
                _ => {
                    self.scroll_table(key.code);
                    None
                }
            },
            Page::CustomQuery => match key.code {
                KeyCode::F(5) => Some(Action::RunQuery(self.editor.text.clone())),
                // Line breaks from typing or unbracketed pastes join the statement.
                KeyCode::Enter => {
                    self.editor.insert(' ');
                    None
                }
                KeyCode::PageUp | KeyCode::PageDown | KeyCode::Up | KeyCode::Down => {
                    self.scroll_table(key.code);
                    None
                }
                _ => {
                    self.editor.handle_edit_key(key);
                    None
                }
            },
        }
    }

    fn scroll_table(&mut self, code: KeyCode) {
        let max = self
            .view
            .as_ref()
            .map(|v| v.table.records.len().saturating_sub(1))
            .unwrap_or(0);
        self.table_scroll = match code {
            KeyCode::Up => self.table_scroll.saturating_sub(1),
            KeyCode::Down => (self.table_scroll + 1).min(max),
            KeyCode::PageUp => self.table_scroll.saturating_sub(10),
            KeyCode::PageDown => (self.table_scroll + 10).min(max),
            _ => self.table_scroll,
        };
    }

    /// Shows a loaded report.
    pub fn show_view(&mut self, view: ReportView) {
        self.view = Some(view);
        self.table_scroll = 0;
    }

    /// Shows a failed load.
    pub fn show_error(&mut self, error: &BoardError) {
        self.notice = Some(Notice::from_error(error));
    }

    /// Stores the country list. Returns the action loading the first country.
    pub fn show_countries(&mut self, countries: Vec<String>) -> Option<Action> {
        self.countries = countries;
        self.country_index = 0;
        if self.countries.is_empty() {
            self.notice = Some(Notice::Info("No countries found".to_string()));
        }
        self.countries.first().cloned().map(Action::LoadRegional)
    }

    /// Shows the outcome of a gated query.
    ///
    /// Blank input changes nothing; any other outcome replaces the previous
    /// result.
    pub fn show_outcome(&mut self, outcome: &QueryOutcome) {
        if matches!(outcome, QueryOutcome::Rejected(r) if r.is_silent()) {
            return;
        }
        match outcome_view(outcome) {
            Some(view) => self.show_view(view),
            None => {
                self.view = None;
                self.table_scroll = 0;
            }
        }
        self.notice = Notice::from_outcome(outcome);
    }

    /// Handles pasted text.
    ///
    /// Goes to the SQL editor or the admin password field; line breaks
    /// become spaces so a pasted statement is never cut short.
    pub fn handle_paste(&mut self, text: &str) {
        let target = match &mut self.screen {
            Screen::Login(login) if login.choice == RoleChoice::Admin => &mut login.password,
            Screen::Dashboard
                if self.page == Page::CustomQuery && self.focus == Focus::Content =>
            {
                &mut self.editor
            }
            _ => return,
        };

        let text = text.replace("\r\n", "\n");
        for c in text.chars() {
            target.insert(if matches!(c, '\n' | '\r') { ' ' } else { c });
        }
    }

    /// The session for gated queries, once logged in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}
