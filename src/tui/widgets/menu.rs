//! Page menu widget for the TUI.

use crate::tui::app::Page;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Left-hand page menu.
pub struct Menu {
    selected: Page,
    focused: bool,
}

impl Menu {
    /// Creates a new menu widget.
    pub fn new(selected: Page, focused: bool) -> Self {
        Self { selected, focused }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        Page::ALL
            .iter()
            .map(|page| {
                if *page == self.selected {
                    let style = if self.focused {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    };
                    Line::from(Span::styled(format!("▶ {}", page.label()), style))
                } else {
                    Line::from(Span::raw(format!("  {}", page.label())))
                }
            })
            .collect()
    }
}

impl Widget for Menu {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Choose a Feature ");

        Paragraph::new(self.lines()).block(block).render(area, buf);
    }
}
