//! Gate integration tests against a live PostgreSQL store.
//!
//! Skipped unless DATABASE_URL is set.

use pretty_assertions::assert_eq;
use trendboard::config::ConnectionConfig;
use trendboard::db::{DatabaseClient, PostgresClient, Value};
use trendboard::gate::{QueryGate, QueryOutcome, Rejection, Role};

async fn get_test_client() -> Option<PostgresClient> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    PostgresClient::connect(&config).await.ok()
}

fn scratch_table(name: &str) -> String {
    format!("trendboard_{}_{}", name, std::process::id())
}

#[tokio::test]
async fn test_restricted_select_returns_rows() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let gate = QueryGate::new(&client);

    let outcome = gate
        .evaluate(Role::Restricted, "SELECT 1 AS a, 2 AS b UNION ALL SELECT 3, 4")
        .await;

    assert_eq!(
        outcome,
        QueryOutcome::Rows {
            columns: vec!["a".to_string(), "b".to_string()],
            records: vec![
                vec![Value::Int(1), Value::Int(2)],
                vec![Value::Int(3), Value::Int(4)],
            ],
        }
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_restricted_select_into_cannot_write() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let gate = QueryGate::new(&client);
    let table = scratch_table("select_into");

    let outcome = gate
        .evaluate(Role::Restricted, &format!("SELECT 1 AS id INTO {table}"))
        .await;

    match outcome {
        QueryOutcome::Failed(message) => assert!(message.contains("read-only transaction")),
        QueryOutcome::Rejected(rejection) => assert_eq!(rejection, Rejection::ReadOnlyRole),
        other => panic!("Expected the write to be refused, got {other:?}"),
    }

    let check = gate
        .evaluate(
            Role::Restricted,
            &format!("SELECT to_regclass('{table}') IS NULL AS missing"),
        )
        .await;
    assert_eq!(
        check,
        QueryOutcome::Rows {
            columns: vec!["missing".to_string()],
            records: vec![vec![Value::Bool(true)]],
        }
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_privileged_statements_commit() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let gate = QueryGate::new(&client);
    let table = scratch_table("commit");

    let created = gate
        .evaluate(Role::Privileged, &format!("CREATE TABLE {table} (id int)"))
        .await;
    assert_eq!(created, QueryOutcome::Ack);

    let inserted = gate
        .evaluate(Role::Privileged, &format!("INSERT INTO {table} VALUES (7)"))
        .await;
    assert_eq!(inserted, QueryOutcome::Ack);

    let read = gate
        .evaluate(Role::Restricted, &format!("SELECT id FROM {table}"))
        .await;
    assert_eq!(
        read,
        QueryOutcome::Rows {
            columns: vec!["id".to_string()],
            records: vec![vec![Value::Int(7)]],
        }
    );

    let dropped = gate
        .evaluate(Role::Privileged, &format!("DROP TABLE {table}"))
        .await;
    assert_eq!(dropped, QueryOutcome::Ack);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_privileged_multi_statement_is_forwarded() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let gate = QueryGate::new(&client);
    let table = scratch_table("multi");

    let created = gate
        .evaluate(
            Role::Privileged,
            &format!(
                "CREATE TABLE {table} (id int); INSERT INTO {table} VALUES (1); \
                 INSERT INTO {table} VALUES (2)"
            ),
        )
        .await;
    assert_eq!(created, QueryOutcome::Ack);

    let read = gate
        .evaluate(
            Role::Privileged,
            &format!("SELECT 0 AS id; SELECT id FROM {table} ORDER BY id"),
        )
        .await;
    assert_eq!(
        read,
        QueryOutcome::Rows {
            columns: vec!["id".to_string()],
            records: vec![vec![Value::Int(1)], vec![Value::Int(2)]],
        }
    );

    let dropped = gate
        .evaluate(Role::Privileged, &format!("DROP TABLE {table}"))
        .await;
    assert_eq!(dropped, QueryOutcome::Ack);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_large_result_reaches_caller_whole() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let gate = QueryGate::new(&client);

    let outcome = gate
        .evaluate(Role::Restricted, "SELECT g FROM generate_series(1, 1500) g")
        .await;

    match outcome {
        QueryOutcome::Rows { records, .. } => assert_eq!(records.len(), 1500),
        other => panic!("Expected rows, got {other:?}"),
    }

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_store_error_is_reported() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let gate = QueryGate::new(&client);

    let outcome = gate
        .evaluate(Role::Restricted, "SELECT * FROM nonexistent_table_xyz")
        .await;

    match outcome {
        QueryOutcome::Failed(message) => assert_eq!(
            message,
            "relation \"nonexistent_table_xyz\" does not exist"
        ),
        other => panic!("Expected a failure, got {other:?}"),
    }

    client.close().await.unwrap();
}
