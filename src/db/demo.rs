//! Built-in streaming catalog for the mock database.
//!
//! Computes the canned report results from a small fixed data set so the
//! dashboard can run without a PostgreSQL server.

use super::{ColumnInfo, QueryResult, Value};
use crate::reports::{Report, COUNTRIES_SQL};
use std::collections::BTreeMap;

/// (title, artist)
const SONGS: &[(&str, &str)] = &[
    ("Blinding Lights", "The Weeknd"),
    ("Save Your Tears", "The Weeknd"),
    ("Levitating", "Dua Lipa"),
    ("Don't Start Now", "Dua Lipa"),
    ("Houdini", "Dua Lipa"),
    ("Flowers", "Miley Cyrus"),
    ("Anti-Hero", "Taylor Swift"),
    ("Cruel Summer", "Taylor Swift"),
    ("Tití Me Preguntó", "Bad Bunny"),
    ("Kill Bill", "SZA"),
];

/// (title, country, date, popularity)
const STREAMING_STATS: &[(&str, &str, &str, i64)] = &[
    ("Blinding Lights", "United States", "2024-03-01", 92),
    ("Blinding Lights", "Germany", "2024-03-01", 85),
    ("Blinding Lights", "Brazil", "2024-03-02", 78),
    ("Save Your Tears", "United States", "2024-03-01", 81),
    ("Levitating", "United States", "2024-03-01", 88),
    ("Levitating", "Germany", "2024-03-02", 90),
    ("Don't Start Now", "Japan", "2024-03-03", 70),
    ("Houdini", "Germany", "2024-03-03", 76),
    ("Flowers", "United States", "2024-03-02", 95),
    ("Flowers", "Brazil", "2024-03-02", 83),
    ("Anti-Hero", "United States", "2024-03-03", 89),
    ("Anti-Hero", "Japan", "2024-03-01", 80),
    ("Cruel Summer", "India", "2024-03-02", 67),
    ("Tití Me Preguntó", "Brazil", "2024-03-01", 94),
    ("Tití Me Preguntó", "United States", "2024-03-03", 72),
    ("Kill Bill", "India", "2024-03-01", 74),
    ("Kill Bill", "Japan", "2024-03-02", 69),
];

/// Returns (sql, binds, result) for every query the demo catalog answers.
pub(super) fn seed() -> Vec<(String, Vec<String>, QueryResult)> {
    let mut seeded = vec![
        (Report::TopSongs.sql().to_string(), Vec::new(), top_songs()),
        (
            Report::PopularArtists.sql().to_string(),
            Vec::new(),
            popular_artists(),
        ),
        (COUNTRIES_SQL.to_string(), Vec::new(), countries()),
    ];

    for country in country_names() {
        seeded.push((
            Report::RegionalTrends.sql().to_string(),
            vec![country.to_string()],
            regional_trends(country),
        ));
    }

    seeded
}

fn country_names() -> Vec<&'static str> {
    let mut names: Vec<&str> = STREAMING_STATS.iter().map(|s| s.1).collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Sorts (label, count) pairs by count descending, then label, and keeps ten.
fn ranked(totals: BTreeMap<&str, i64>) -> Vec<(&str, i64)> {
    let mut ranked: Vec<(&str, i64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.truncate(10);
    ranked
}

fn top_songs() -> QueryResult {
    let mut totals = BTreeMap::new();
    for (title, _, _, popularity) in STREAMING_STATS {
        *totals.entry(*title).or_insert(0) += popularity;
    }

    let rows = ranked(totals)
        .into_iter()
        .map(|(title, total)| vec![Value::from(title), Value::Int(total)])
        .collect();

    QueryResult::with_data(
        vec![
            ColumnInfo::new("title", "VARCHAR"),
            ColumnInfo::new("total_popularity", "INT8"),
        ],
        rows,
    )
}

fn popular_artists() -> QueryResult {
    let mut counts = BTreeMap::new();
    for (_, artist) in SONGS {
        *counts.entry(*artist).or_insert(0) += 1;
    }

    let rows = ranked(counts)
        .into_iter()
        .map(|(artist, songs)| vec![Value::from(artist), Value::Int(songs)])
        .collect();

    QueryResult::with_data(
        vec![
            ColumnInfo::new("name", "VARCHAR"),
            ColumnInfo::new("num_songs", "INT8"),
        ],
        rows,
    )
}

fn countries() -> QueryResult {
    let rows = country_names()
        .into_iter()
        .map(|name| vec![Value::from(name)])
        .collect();

    QueryResult::with_data(vec![ColumnInfo::new("name", "VARCHAR")], rows)
}

fn regional_trends(country: &str) -> QueryResult {
    let mut stats: Vec<_> = STREAMING_STATS
        .iter()
        .filter(|s| s.1 == country)
        .collect();
    stats.sort_by(|a, b| b.3.cmp(&a.3));
    stats.truncate(10);

    let rows = stats
        .into_iter()
        .map(|(title, _, date, popularity)| {
            vec![Value::from(*title), Value::from(*date), Value::Int(*popularity)]
        })
        .collect();

    QueryResult::with_data(
        vec![
            ColumnInfo::new("title", "VARCHAR"),
            ColumnInfo::new("date", "DATE"),
            ColumnInfo::new("popularity", "INT4"),
        ],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_songs_ranked_by_total() {
        let result = top_songs();
        // Blinding Lights: 92 + 85 + 78
        assert_eq!(
            result.rows[0],
            vec![Value::from("Blinding Lights"), Value::Int(255)]
        );
        let totals: Vec<f64> = result.rows.iter().filter_map(|r| r[1].as_f64()).collect();
        assert!(totals.windows(2).all(|w| w[0] >= w[1]));
        assert!(result.row_count <= 10);
    }

    #[test]
    fn test_popular_artists_counts_songs() {
        let result = popular_artists();
        assert_eq!(result.rows[0], vec![Value::from("Dua Lipa"), Value::Int(3)]);
    }

    #[test]
    fn test_countries_sorted_and_distinct() {
        let names = country_names();
        assert_eq!(
            names,
            vec!["Brazil", "Germany", "India", "Japan", "United States"]
        );
    }

    #[test]
    fn test_regional_trends_filters_country() {
        let result = regional_trends("Brazil");
        assert_eq!(result.row_count, 3);
        assert_eq!(result.rows[0][0], Value::from("Tití Me Preguntó"));
        assert_eq!(result.rows[0][1], Value::from("2024-03-01"));
    }

    #[test]
    fn test_seed_covers_every_country() {
        let seeded = seed();
        assert_eq!(seeded.len(), 3 + country_names().len());
    }
}
