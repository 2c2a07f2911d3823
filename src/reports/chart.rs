//! Bar chart extraction from tabular results.

use super::TableData;
use serde::Serialize;

/// A categorical bar series keyed by a table's first column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarSeries {
    /// Header of the category column.
    pub category_label: String,
    /// Header of the value column.
    pub value_label: String,
    /// (category, value) pairs in record order.
    pub bars: Vec<(String, u64)>,
}

impl BarSeries {
    /// Derives a series from a table.
    ///
    /// Categories come from the first column. Values come from the first
    /// later column holding at least one number; NULLs count as zero and
    /// negative or fractional values are clamped and rounded. Returns `None`
    /// when there is no such column or no records.
    pub fn from_table(table: &TableData) -> Option<Self> {
        if table.columns.len() < 2 || table.records.is_empty() {
            return None;
        }

        let value_index = (1..table.columns.len()).find(|&i| {
            let mut has_number = false;
            for record in &table.records {
                match record.get(i) {
                    Some(value) if value.as_f64().is_some() => has_number = true,
                    Some(value) if value.is_null() => {}
                    _ => return false,
                }
            }
            has_number
        })?;

        let bars = table
            .records
            .iter()
            .map(|record| {
                let category = record
                    .first()
                    .map(|v| v.to_display_string())
                    .unwrap_or_default();
                let value = record
                    .get(value_index)
                    .and_then(|v| v.as_f64())
                    .map(|v| v.max(0.0).round() as u64)
                    .unwrap_or(0);
                (category, value)
            })
            .collect();

        Some(Self {
            category_label: table.columns[0].clone(),
            value_label: table.columns[value_index].clone(),
            bars,
        })
    }

    /// Largest value in the series.
    pub fn max_value(&self) -> u64 {
        self.bars.iter().map(|(_, v)| *v).max().unwrap_or(0)
    }

    /// Renders the series as plain-text bars scaled to `width` cells.
    pub fn to_text_lines(&self, width: usize) -> Vec<String> {
        let label_width = self
            .bars
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        let max = self.max_value().max(1);

        self.bars
            .iter()
            .map(|(label, value)| {
                let filled = ((*value as f64 / max as f64) * width as f64).round() as usize;
                format!(
                    "{:label_width$} │{} {}",
                    label,
                    "█".repeat(filled),
                    value,
                    label_width = label_width
                )
            })
            .collect()
    }
}
