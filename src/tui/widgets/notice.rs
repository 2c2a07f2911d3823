//! Notice bar widget for the TUI.
//!
//! Shows the latest notice on one line, or key hints when there is none.

use crate::app::Notice;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// One-line notice bar.
pub struct NoticeBar<'a> {
    notice: Option<&'a Notice>,
    hints: &'a str,
}

impl<'a> NoticeBar<'a> {
    /// Creates a new notice bar.
    pub fn new(notice: Option<&'a Notice>, hints: &'a str) -> Self {
        Self { notice, hints }
    }

    fn line(&self) -> Line<'a> {
        let Some(notice) = self.notice else {
            return Line::from(Span::styled(
                self.hints,
                Style::default().fg(Color::DarkGray),
            ));
        };

        let (icon, color) = match notice {
            Notice::Success(_) => ("✓", Color::Green),
            Notice::Error(_) => ("✗", Color::Red),
            Notice::Info(_) => ("i", Color::Cyan),
        };
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        Line::from(vec![
            Span::styled(format!(" {icon} "), style),
            Span::styled(notice.message(), style),
        ])
    }
}

impl Widget for NoticeBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}
