//! Login dialog and blocking error screen.

use crate::session::RoleChoice;
use crate::tui::app::LoginState;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Renders the role selection dialog.
pub fn render_login(frame: &mut Frame, login: &LoginState) {
    let area = frame.area();
    let dialog_area = center_rect(56.min(area.width), 12.min(area.height), area);

    frame.render_widget(Clear, dialog_area);

    let lines = login_lines(login);
    let block = Block::default()
        .title(" Spotify Trend Analysis Dashboard ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), dialog_area);

    if login.choice == RoleChoice::Admin {
        // border (1) + "  Password: " (12)
        let x = dialog_area.x + 13 + login.password.cursor as u16;
        let y = dialog_area.y + 5;
        if x < dialog_area.right() && y < dialog_area.bottom() {
            frame.set_cursor_position((x, y));
        }
    }
}

fn login_lines(login: &LoginState) -> Vec<Line<'static>> {
    let selected = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let hint = Style::default().fg(Color::DarkGray);

    let option = |choice: RoleChoice| {
        if login.choice == choice {
            Line::from(Span::styled(format!("  ▶ {}", choice.label()), selected))
        } else {
            Line::from(format!("    {}", choice.label()))
        }
    };

    let mut lines = vec![
        Line::from(Span::styled("Choose how to sign in:", hint)),
        Line::from(""),
        option(RoleChoice::Analyst),
        option(RoleChoice::Admin),
    ];

    if login.choice == RoleChoice::Admin {
        lines.push(Line::from(vec![
            Span::raw("  Password: "),
            Span::raw("*".repeat(login.password.text.chars().count())),
        ]));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑/↓ choose  Enter sign in  Esc quit",
        hint,
    )));
    lines
}

/// Renders the blocking connection failure screen.
pub fn render_blocked(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let dialog_area = center_rect(70.min(area.width), 9.min(area.height), area);

    frame.render_widget(Clear, dialog_area);

    let lines = vec![
        Line::from(Span::styled(
            "Could not connect to the database.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press q to quit.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Connection Error ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        dialog_area,
    );
}

/// Centers a rectangle of the given size within the parent area.
fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
