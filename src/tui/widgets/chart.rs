//! Horizontal bar chart widget for the TUI.

use crate::reports::BarSeries;
use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};

/// Bar chart keyed by a series' category column.
pub struct SeriesChart<'a> {
    series: &'a BarSeries,
}

impl<'a> SeriesChart<'a> {
    /// Creates a new chart widget.
    pub fn new(series: &'a BarSeries) -> Self {
        Self { series }
    }

    fn bars(&self) -> Vec<Bar<'a>> {
        self.series
            .bars
            .iter()
            .map(|(label, value)| {
                Bar::default()
                    .label(Line::from(label.as_str()))
                    .value(*value)
                    .style(Style::default().fg(Color::Green))
                    .value_style(Style::default().fg(Color::Black).bg(Color::Green))
            })
            .collect()
    }
}

impl Widget for SeriesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(
                " {} by {} ",
                self.series.value_label, self.series.category_label
            ));

        let bars = self.bars();
        BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> BarSeries {
        BarSeries {
            category_label: "Artist".into(),
            value_label: "Number of Songs".into(),
            bars: vec![("Dua Lipa".into(), 3), ("SZA".into(), 1)],
        }
    }

    #[test]
    fn test_one_bar_per_record() {
        let series = series();
        assert_eq!(SeriesChart::new(&series).bars().len(), 2);
    }

    #[test]
    fn test_render_titles_chart() {
        let series = series();
        let area = Rect::new(0, 0, 50, 6);
        let mut buf = Buffer::empty(area);
        SeriesChart::new(&series).render(area, &mut buf);

        let top: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(top.contains("Number of Songs by Artist"));
    }
}
