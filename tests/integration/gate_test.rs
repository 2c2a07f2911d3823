//! End-to-end gate scenarios through the dashboard.

use pretty_assertions::assert_eq;
use trendboard::app::{Dashboard, Notice};
use trendboard::db::Value;
use trendboard::gate::{QueryOutcome, Rejection, Role};
use trendboard::reports::{Report, COUNTRIES_SQL};
use trendboard::session::{AdminSecret, RoleChoice, Session};

fn analyst() -> Session {
    Session::start(RoleChoice::Analyst, None, None).session
}

fn admin() -> Session {
    let secret = AdminSecret::new("open-sesame");
    let start = Session::start(RoleChoice::Admin, Some("open-sesame"), Some(&secret));
    assert!(start.warning.is_none());
    start.session
}

#[tokio::test]
async fn test_analyst_browses_countries() {
    let dashboard = Dashboard::with_demo_data();

    let outcome = dashboard
        .run_query(&analyst(), COUNTRIES_SQL)
        .await;

    let QueryOutcome::Rows { columns, records } = outcome else {
        panic!("expected rows, got {outcome:?}");
    };
    assert_eq!(columns, vec!["name"]);
    assert_eq!(records.first(), Some(&vec![Value::from("Brazil")]));
}

#[tokio::test]
async fn test_analyst_cannot_modify() {
    let dashboard = Dashboard::with_demo_data();
    let session = analyst();

    for sql in ["DELETE FROM songs", "update songs set title = 'x'", "DROP TABLE albums"] {
        let outcome = dashboard.run_query(&session, sql).await;
        assert_eq!(outcome, QueryOutcome::Rejected(Rejection::ReadOnlyRole), "{sql}");
    }

    // The catalog is untouched.
    let view = dashboard
        .report(Report::TopSongs)
        .await
        .unwrap();
    assert_eq!(view.table.records[0][0], Value::from("Blinding Lights"));
}

#[tokio::test]
async fn test_admin_modification_is_acknowledged() {
    let dashboard = Dashboard::with_demo_data();
    let session = admin();
    assert_eq!(session.role(), Role::Privileged);

    let outcome = dashboard
        .run_query(&session, "UPDATE songs SET title = 'x' WHERE song_id = 1")
        .await;

    assert_eq!(outcome, QueryOutcome::Ack);
    assert_eq!(
        Notice::from_outcome(&outcome),
        Some(Notice::Success("Query executed successfully!".to_string()))
    );
}

#[tokio::test]
async fn test_wrong_password_falls_back_to_analyst() {
    let secret = AdminSecret::new("open-sesame");
    let start = Session::start(RoleChoice::Admin, Some("guess"), Some(&secret));

    assert_eq!(start.session.role(), Role::Restricted);
    assert!(start.warning.is_some());

    let outcome = Dashboard::with_demo_data()
        .run_query(&start.session, "DELETE FROM songs")
        .await;
    assert_eq!(outcome, QueryOutcome::Rejected(Rejection::ReadOnlyRole));
}

#[tokio::test]
async fn test_blank_query_is_silent() {
    let outcome = Dashboard::with_demo_data().run_query(&admin(), "   ").await;

    assert_eq!(outcome, QueryOutcome::Rejected(Rejection::EmptyQuery));
    assert_eq!(Notice::from_outcome(&outcome), None);
}

#[tokio::test]
async fn test_regional_trends_for_every_country() {
    let dashboard = Dashboard::with_demo_data();

    for country in dashboard.countries().await.unwrap() {
        let view = dashboard.regional_trends(&country).await.unwrap();
        assert_eq!(view.table.columns, vec!["Song", "Date", "Popularity"], "{country}");
        assert!(view.table.records.len() <= 10);
    }
}
