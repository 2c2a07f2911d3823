//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus, Page, Screen};
use super::widgets::{chart, editor, header, login, menu, notice, table};
use crate::reports::ReportView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const MENU_HINTS: &str = " ↑/↓ page  Enter/Tab open  q quit";
const CONTENT_HINTS: &str = " Tab/Esc menu  ↑/↓ scroll  Ctrl+C quit";
const REGIONAL_HINTS: &str = " ↑/↓ country  Enter show  Tab/Esc menu";
const QUERY_HINTS: &str = " F5 execute  Ctrl+U clear  ↑/↓ scroll  Tab/Esc menu";

const OVERVIEW: &[&str] = &[
    "Analyze song trends, artist popularity, regional streaming statistics,",
    "and run your own SQL queries.",
    "",
    "Project Overview",
    "",
    "Streaming services generate large amounts of data about music streaming,",
    "artist performance, album trends and regional preferences. This dashboard",
    "reads a structured streaming insights database so music analysts, record",
    "labels and independent artists can track song trends across regions.",
    "",
    "Use the menu on the left to navigate the features.",
];

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    match &app.screen {
        Screen::Login(state) => login::render_login(frame, state),
        Screen::Blocked(message) => login::render_blocked(frame, message),
        Screen::Dashboard => render_dashboard(frame, app),
    }
}

fn render_dashboard(frame: &mut Frame, app: &App) {
    let [header_area, body_area, notice_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [menu_area, content_area] =
        Layout::horizontal([Constraint::Length(24), Constraint::Min(20)]).areas(body_area);

    frame.render_widget(
        header::Header::new(&app.connection_info, app.role()),
        header_area,
    );
    frame.render_widget(
        menu::Menu::new(app.page, app.focus == Focus::Menu),
        menu_area,
    );
    render_content(frame, content_area, app);
    frame.render_widget(
        notice::NoticeBar::new(app.notice.as_ref(), hints(app)),
        notice_area,
    );
}

fn hints(app: &App) -> &'static str {
    match (app.focus, app.page) {
        (Focus::Menu, _) => MENU_HINTS,
        (Focus::Content, Page::RegionalTrends) => REGIONAL_HINTS,
        (Focus::Content, Page::CustomQuery) => QUERY_HINTS,
        (Focus::Content, _) => CONTENT_HINTS,
    }
}

fn render_content(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Content;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", app.page.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.page {
        Page::Home => {
            let lines: Vec<Line> = OVERVIEW.iter().map(|l| Line::from(*l)).collect();
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }
        Page::TopSongs | Page::PopularArtists => render_view(frame, inner, app),
        Page::RegionalTrends => render_regional(frame, inner, app),
        Page::CustomQuery => render_custom_query(frame, inner, app),
    }
}

fn render_view(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = &app.view else {
        return;
    };
    render_report(frame, area, view, app.table_scroll);
}

fn render_report(frame: &mut Frame, area: Rect, view: &ReportView, scroll: usize) {
    let table = table::ResultTable::new(&view.table).scroll(scroll);

    match &view.chart {
        Some(series) if area.height >= 12 => {
            let chart_height = (series.bars.len() as u16 + 2).min(area.height / 2);
            let [table_area, chart_area] = Layout::vertical([
                Constraint::Min(5),
                Constraint::Length(chart_height),
            ])
            .areas(area);
            frame.render_widget(table, table_area);
            frame.render_widget(chart::SeriesChart::new(series), chart_area);
        }
        _ => frame.render_widget(table, area),
    }
}

fn render_regional(frame: &mut Frame, area: Rect, app: &App) {
    let [list_area, table_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(10)])
        .areas(area);

    let items: Vec<ListItem> = app
        .countries
        .iter()
        .map(|c| ListItem::new(c.as_str()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::RIGHT)
                .title("Select a Country:"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(Some(app.country_index));
    frame.render_stateful_widget(list, list_area, &mut state);

    if let Some(view) = &app.view {
        let table = table::ResultTable::new(&view.table).scroll(app.table_scroll);
        frame.render_widget(table, table_area.inner(Margin::new(1, 0)));
    }
}

fn render_custom_query(frame: &mut Frame, area: Rect, app: &App) {
    let [hint_area, editor_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            app.query_hint(),
            Style::default().fg(Color::Yellow),
        ))),
        hint_area,
    );

    let focused = app.focus == Focus::Content;
    frame.render_widget(
        editor::QueryEditor::new(&app.editor.text, app.editor.cursor, focused),
        editor_area,
    );
    if focused {
        frame.set_cursor_position(editor::QueryEditor::cursor_position(
            editor_area,
            app.editor.cursor,
        ));
    }

    if let Some(view) = &app.view {
        render_report(frame, result_area, view, app.table_scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{QueryOutcome, Rejection};
    use crate::session::AdminSecret;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn logged_in() -> App {
        let mut app = App::new("demo catalog", Some(AdminSecret::new("pw")));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        app
    }

    #[test]
    fn test_login_screen() {
        let screen = draw(&App::new("demo catalog", None));
        assert!(screen.contains("Analyst (read-only)"));
        assert!(screen.contains("Administrator"));
    }

    #[test]
    fn test_blocked_screen() {
        let screen = draw(&App::blocked("db", "Cannot connect to localhost:5432"));
        assert!(screen.contains("Connection Error"));
        assert!(screen.contains("Cannot connect to localhost:5432"));
    }

    #[test]
    fn test_dashboard_home() {
        let screen = draw(&logged_in());
        assert!(screen.contains("READ-ONLY"));
        assert!(screen.contains("Custom SQL Query"));
        assert!(screen.contains("Project Overview"));
    }

    #[test]
    fn test_custom_query_page_shows_hint_and_notice() {
        let mut app = logged_in();
        app.open_page(Page::CustomQuery);
        app.show_outcome(&QueryOutcome::Rejected(Rejection::ReadOnlyRole));

        let screen = draw(&app);
        assert!(screen.contains("only SELECT queries are permitted"));
        assert!(screen.contains("restricted role: only read queries permitted"));
    }
}
