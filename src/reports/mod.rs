//! Canned dashboard reports.
//!
//! Each report is a fixed read-only query with display labels that replace
//! the store's column names.

pub mod chart;

pub use chart::BarSeries;

use crate::db::Row;
use std::fmt;

/// Lists the countries available to the regional report.
pub const COUNTRIES_SQL: &str = "SELECT DISTINCT name FROM countries ORDER BY name";

const TOP_SONGS_SQL: &str = "\
SELECT s.title, SUM(ss.popularity) AS total_popularity
FROM songs s
JOIN streaming_stats ss ON s.song_id = ss.song_id
GROUP BY s.title
ORDER BY total_popularity DESC
LIMIT 10";

const POPULAR_ARTISTS_SQL: &str = "\
SELECT ar.name, COUNT(s.song_id) AS num_songs
FROM artists ar
JOIN albums al ON ar.artist_id = al.artist_id
JOIN songs s ON al.album_id = s.album_id
GROUP BY ar.name
ORDER BY num_songs DESC
LIMIT 10";

const REGIONAL_TRENDS_SQL: &str = "\
SELECT s.title, ss.date, ss.popularity
FROM songs s
JOIN streaming_stats ss ON s.song_id = ss.song_id
JOIN countries c ON ss.country_id = c.country_id
WHERE c.name = $1
ORDER BY ss.popularity DESC
LIMIT 10";

/// A canned report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    /// Songs ranked by total popularity across all countries.
    TopSongs,
    /// Artists ranked by number of songs.
    PopularArtists,
    /// The most popular songs in one country; takes the country name as `$1`.
    RegionalTrends,
}

impl Report {
    /// All reports in menu order.
    pub const ALL: [Report; 3] = [Report::TopSongs, Report::PopularArtists, Report::RegionalTrends];

    /// Report SQL.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::TopSongs => TOP_SONGS_SQL,
            Self::PopularArtists => POPULAR_ARTISTS_SQL,
            Self::RegionalTrends => REGIONAL_TRENDS_SQL,
        }
    }

    /// Heading shown above the report.
    pub fn title(&self) -> &'static str {
        match self {
            Self::TopSongs => "Top Songs Based on Popularity",
            Self::PopularArtists => "Most Popular Artists by Number of Songs",
            Self::RegionalTrends => "Explore Regional Trends",
        }
    }

    /// Column labels, applied positionally.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::TopSongs => &["Song", "Total Popularity"],
            Self::PopularArtists => &["Artist", "Number of Songs"],
            Self::RegionalTrends => &["Song", "Date", "Popularity"],
        }
    }

    /// Whether the report is drawn as a bar chart as well as a table.
    pub fn has_chart(&self) -> bool {
        matches!(self, Self::TopSongs | Self::PopularArtists)
    }

    /// Parses a command-line report name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "top-songs" | "top_songs" => Some(Self::TopSongs),
            "popular-artists" | "popular_artists" => Some(Self::PopularArtists),
            "regional-trends" | "regional_trends" => Some(Self::RegionalTrends),
            _ => None,
        }
    }

    /// Returns the command-line name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopSongs => "top-songs",
            Self::PopularArtists => "popular-artists",
            Self::RegionalTrends => "regional-trends",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered columns and records ready for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    /// Column headers.
    pub columns: Vec<String>,
    /// Records in store order.
    pub records: Vec<Row>,
}

impl TableData {
    /// Creates table data from columns and records.
    pub fn new(columns: Vec<String>, records: Vec<Row>) -> Self {
        Self { columns, records }
    }

    /// Replaces column names with labels, position by position.
    ///
    /// Columns beyond the label list keep their store names.
    pub fn relabel(mut self, labels: &[&str]) -> Self {
        for (column, label) in self.columns.iter_mut().zip(labels) {
            *column = label.to_string();
        }
        self
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A rendered report: heading, table and optional chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    /// Heading.
    pub title: String,
    /// Table contents.
    pub table: TableData,
    /// Bar chart keyed by the first column.
    pub chart: Option<BarSeries>,
}

impl ReportView {
    /// Builds the view for a report from the store's table.
    pub fn for_report(report: Report, table: TableData) -> Self {
        let table = table.relabel(report.labels());
        let chart = if report.has_chart() {
            BarSeries::from_table(&table)
        } else {
            None
        };
        Self {
            title: report.title().to_string(),
            table,
            chart,
        }
    }

    /// Builds the view for an ad-hoc query's rows.
    ///
    /// Store column names are kept; a chart is attached when one can be derived.
    pub fn for_query(table: TableData) -> Self {
        let chart = BarSeries::from_table(&table);
        Self {
            title: QUERY_RESULT_TITLE.to_string(),
            table,
            chart,
        }
    }
}

/// Heading for ad-hoc query results.
pub const QUERY_RESULT_TITLE: &str = "Query Result";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;
    use pretty_assertions::assert_eq;

    fn store_table() -> TableData {
        TableData::new(
            vec!["title".to_string(), "total_popularity".to_string()],
            vec![
                vec![Value::from("Blinding Lights"), Value::Int(255)],
                vec![Value::from("Flowers"), Value::Int(178)],
            ],
        )
    }

    #[test]
    fn test_report_parse_round_trip() {
        for report in Report::ALL {
            assert_eq!(Report::parse(report.as_str()), Some(report));
        }
        assert_eq!(Report::parse("TOP_SONGS"), Some(Report::TopSongs));
        assert_eq!(Report::parse("charts"), None);
    }

    #[test]
    fn test_regional_report_binds_country() {
        assert!(Report::RegionalTrends.sql().contains("$1"));
        assert!(!Report::TopSongs.sql().contains("$1"));
    }

    #[test]
    fn test_report_sql_is_read_only() {
        for report in Report::ALL {
            assert!(report.sql().trim_start().to_lowercase().starts_with("select"));
        }
    }

    #[test]
    fn test_relabel_is_positional() {
        let table = store_table().relabel(&["Song"]);
        assert_eq!(table.columns, vec!["Song", "total_popularity"]);
    }

    #[test]
    fn test_view_for_charted_report() {
        let view = ReportView::for_report(Report::TopSongs, store_table());

        assert_eq!(view.title, "Top Songs Based on Popularity");
        assert_eq!(view.table.columns, vec!["Song", "Total Popularity"]);
        let chart = view.chart.unwrap();
        assert_eq!(chart.value_label, "Total Popularity");
        assert_eq!(chart.bars[0], ("Blinding Lights".to_string(), 255));
    }

    #[test]
    fn test_view_for_regional_report_has_no_chart() {
        let table = TableData::new(
            vec!["title".into(), "date".into(), "popularity".into()],
            vec![vec![
                Value::from("Flowers"),
                Value::from("2024-03-02"),
                Value::Int(83),
            ]],
        );
        let view = ReportView::for_report(Report::RegionalTrends, table);
        assert!(view.chart.is_none());
        assert_eq!(view.table.columns, vec!["Song", "Date", "Popularity"]);
    }

    #[test]
    fn test_view_for_query_keeps_store_names() {
        let view = ReportView::for_query(store_table());
        assert_eq!(view.title, QUERY_RESULT_TITLE);
        assert_eq!(view.table.columns, vec!["title", "total_popularity"]);
        assert!(view.chart.is_some());
    }
}
