//! Single-line SQL editor widget for the TUI.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns the number of characters to skip from the start of the text.
pub fn calculate_scroll_offset(cursor: usize, available_width: usize) -> usize {
    cursor.saturating_sub(available_width)
}

/// Editor widget.
pub struct QueryEditor<'a> {
    text: &'a str,
    cursor: usize,
    focused: bool,
}

impl<'a> QueryEditor<'a> {
    /// Creates a new editor widget.
    pub fn new(text: &'a str, cursor: usize, focused: bool) -> Self {
        Self {
            text,
            cursor,
            focused,
        }
    }

    /// Text width inside the borders and prompt, keeping one cell for the cursor.
    pub fn available_width(area: Rect) -> usize {
        area.width.saturating_sub(5) as usize
    }

    /// Screen position of the cursor.
    pub fn cursor_position(area: Rect, cursor: usize) -> (u16, u16) {
        let offset = calculate_scroll_offset(cursor, Self::available_width(area));
        // border (1) + prompt "> " (2)
        let x = area.x + 3 + (cursor - offset) as u16;
        (x, area.y + 1)
    }
}

impl Widget for QueryEditor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Enter your SQL query (F5: execute, Ctrl+U: clear) ");

        let prompt_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);

        let scroll_offset = calculate_scroll_offset(self.cursor, Self::available_width(area));
        let visible_text: String = self.text.chars().skip(scroll_offset).collect();

        let line = Line::from(vec![
            Span::styled("> ", prompt_style),
            Span::raw(visible_text),
        ]);

        Paragraph::new(line).block(block).render(area, buf);
    }
}
