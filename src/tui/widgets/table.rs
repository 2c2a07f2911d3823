//! Result table widget for the TUI.
//!
//! Renders tabular data with box-drawn borders, column headers,
//! auto-sized columns, and styled NULL values.

use crate::db::Value;
use crate::reports::TableData;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Widget for rendering table data.
pub struct ResultTable<'a> {
    table: &'a TableData,
    /// Records to skip from the top.
    scroll: usize,
}

impl<'a> ResultTable<'a> {
    /// Creates a new result table widget.
    pub fn new(table: &'a TableData) -> Self {
        Self { table, scroll: 0 }
    }

    /// Skips the first `scroll` records.
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Calculates the optimal width for each column.
    fn calculate_column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .table
            .columns
            .iter()
            .map(|col| col.chars().count().max(MIN_COLUMN_WIDTH))
            .collect();

        for row in &self.table.records {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(value.to_display_string().chars().count());
            }
        }

        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    /// Truncates a string to fit within the given width, adding ellipsis if needed.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let head: String = s.chars().take(max_width - 3).collect();
            format!("{head}...")
        }
    }

    /// Renders the table to a vector of Lines for embedding in other widgets.
    pub fn render_to_lines(&self, available_width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if self.table.columns.is_empty() {
            lines.push(Line::from(Span::styled(
                "(empty result)",
                Style::default().fg(Color::DarkGray),
            )));
            return lines;
        }

        let widths = self.calculate_column_widths();

        // Borders and padding take three cells per column plus one.
        let total_width: usize = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
        let scale_factor = if total_width > available_width && available_width > 0 {
            available_width as f64 / total_width as f64
        } else {
            1.0
        };

        let adjusted_widths: Vec<usize> = widths
            .iter()
            .map(|&w| ((w as f64 * scale_factor) as usize).max(MIN_COLUMN_WIDTH))
            .collect();

        lines.push(Self::render_border(&adjusted_widths, '┌', '┬', '┐'));
        lines.push(self.render_header_row(&adjusted_widths));
        lines.push(Self::render_border(&adjusted_widths, '├', '┼', '┤'));

        for row in self.table.records.iter().skip(self.scroll) {
            lines.push(Self::render_data_row(row, &adjusted_widths));
        }

        lines.push(Self::render_border(&adjusted_widths, '└', '┴', '┘'));

        let count = self.table.records.len();
        let footer = format!("{} row{}", count, if count == 1 { "" } else { "s" });
        lines.push(Line::from(Span::styled(
            footer,
            Style::default().fg(Color::DarkGray),
        )));

        lines
    }

    /// Renders the table as plain text, one string per line.
    pub fn to_text_lines(&self, available_width: usize) -> Vec<String> {
        self.render_to_lines(available_width)
            .into_iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    fn render_border(widths: &[usize], left: char, mid: char, right: char) -> Line<'static> {
        let mut border = String::new();
        border.push(left);

        for (i, &width) in widths.iter().enumerate() {
            border.push_str(&"─".repeat(width + 2));
            if i < widths.len() - 1 {
                border.push(mid);
            }
        }

        border.push(right);

        Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
    }

    fn render_header_row(&self, widths: &[usize]) -> Line<'static> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (name, &width) in self.table.columns.iter().zip(widths) {
            let name = Self::truncate(name, width);
            spans.push(Span::styled(
                Self::pad(&name, width),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    fn render_data_row(row: &[Value], widths: &[usize]) -> Line<'static> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (i, &width) in widths.iter().enumerate() {
            let value = row.get(i).unwrap_or(&Value::Null);
            let truncated = Self::truncate(&value.to_display_string(), width);

            let style = if value.is_null() {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };

            spans.push(Span::styled(Self::pad(&truncated, width), style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    /// Pads to `width` display characters with one space either side.
    fn pad(s: &str, width: usize) -> String {
        let fill = width.saturating_sub(s.chars().count());
        format!(" {}{} ", s, " ".repeat(fill))
    }
}

impl Widget for ResultTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.render_to_lines(area.width as usize);

        for (i, line) in lines.iter().take(area.height as usize).enumerate() {
            buf.set_line(area.x, area.y + i as u16, line, area.width);
        }
    }
}
