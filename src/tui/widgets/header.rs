//! Header widget for the TUI.
//!
//! Displays the application name, the session role and the connection info.

use crate::gate::Role;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Header bar widget.
pub struct Header<'a> {
    connection_info: &'a str,
    role: Option<Role>,
}

impl<'a> Header<'a> {
    /// Creates a new header widget.
    pub fn new(connection_info: &'a str, role: Option<Role>) -> Self {
        Self {
            connection_info,
            role,
        }
    }

    fn badge(role: Role) -> (String, Style) {
        let color = match role {
            Role::Restricted => Color::Yellow,
            Role::Privileged => Color::Red,
        };
        (
            format!(" {} ", role.label().to_uppercase()),
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" Trendboard v{} ", env!("CARGO_PKG_VERSION"));
        let left_width = left_text.chars().count() as u16;
        buf.set_span(area.x, area.y, &Span::styled(left_text, style), area.width);

        if let Some(role) = self.role {
            let (text, badge_style) = Self::badge(role);
            buf.set_span(
                area.x + left_width,
                area.y,
                &Span::styled(text, badge_style),
                area.width.saturating_sub(left_width),
            );
        }

        let right_text = format!(" [db: {}] ", self.connection_info);
        let right_width = right_text.chars().count() as u16;
        if right_width + left_width + 12 < area.width {
            let right_x = area.right().saturating_sub(right_width);
            buf.set_string(right_x, area.y, &right_text, style);
        }
    }
}
