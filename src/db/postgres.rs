//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{
    AccessMode, ColumnInfo, DatabaseClient, QueryRequest, QueryResult, Row, StatementResult, Value,
};
use crate::error::{BoardError, Result};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use futures::TryStreamExt;
use sqlx::postgres::{
    PgConnection, PgDatabaseError, PgPool, PgPoolOptions, PgRow, PgStatement, Postgres,
};
use sqlx::{
    Column as SqlxColumn, Either, Executor, Row as SqlxRow, Statement, Transaction, TypeInfo,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Creates a new PostgresClient from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database, retrying transient failures with backoff.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .connect(&conn_str)
                .await;

            match result {
                Ok(pool) => {
                    debug!("Successfully connected to database");
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);
                    last_error = Some(e);

                    if attempt < MAX_RETRY_ATTEMPTS && is_transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    } else {
                        break;
                    }
                }
            }
        }

        Err(match last_error {
            Some(error) => map_connection_error(error, config),
            None => BoardError::connection("No connection attempt was made"),
        })
    }

    /// Opens a transaction, read-only for restricted requests.
    async fn begin(&self, access: AccessMode) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            BoardError::connection(format!("Failed to acquire a connection: {e}"))
        })?;

        if access == AccessMode::ReadOnly {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
        }

        Ok(tx)
    }

    /// Runs one request inside a transaction on a single pooled connection.
    ///
    /// The transaction is rolled back when dropped, so every early return
    /// leaves the database untouched and hands the connection back to the pool.
    /// Text holding several commands cannot be prepared; it is sent over the
    /// simple query protocol in a fresh transaction instead.
    async fn run_in_transaction(&self, request: &QueryRequest) -> Result<StatementResult> {
        let start = Instant::now();
        let mut tx = self.begin(request.access).await?;

        let prepared = (&mut *tx).prepare(request.sql.as_str()).await;
        let result = match prepared {
            Ok(statement) => run_prepared(&mut tx, statement, request, start).await?,
            Err(e) if is_multiple_commands_error(&e) && request.binds.is_empty() => {
                debug!("Statement text holds several commands, using the simple query protocol");
                // The failed prepare aborted the transaction.
                tx.rollback().await.map_err(query_error)?;
                tx = self.begin(request.access).await?;
                run_simple(&mut tx, &request.sql, start).await?
            }
            Err(e) => return Err(query_error(e)),
        };

        match request.access {
            AccessMode::ReadWrite => tx.commit().await,
            AccessMode::ReadOnly => tx.rollback().await,
        }
        .map_err(query_error)?;

        Ok(result)
    }
}

/// Runs a single prepared statement, classified by whether it describes columns.
async fn run_prepared(
    conn: &mut PgConnection,
    statement: PgStatement<'_>,
    request: &QueryRequest,
    start: Instant,
) -> Result<StatementResult> {
    let columns: Vec<ColumnInfo> = statement
        .columns()
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect();

    let mut query = statement.query();
    for value in &request.binds {
        query = query.bind(value.as_str());
    }

    if columns.is_empty() {
        let done = query.execute(&mut *conn).await.map_err(query_error)?;
        return Ok(StatementResult::Command {
            rows_affected: done.rows_affected(),
        });
    }

    let fetched: Vec<PgRow> = query.fetch_all(&mut *conn).await.map_err(query_error)?;
    Ok(rows_result(columns, &fetched, start))
}

/// Runs several commands over the simple query protocol.
///
/// The outcome is that of the last command. The simple protocol sends no
/// row description for an empty result, so a last `SELECT` with no rows is
/// reported as a command.
async fn run_simple(conn: &mut PgConnection, sql: &str, start: Instant) -> Result<StatementResult> {
    let mut stream = sqlx::raw_sql(sql).fetch_many(&mut *conn);
    let mut pending: Vec<PgRow> = Vec::new();
    let mut last = StatementResult::Command { rows_affected: 0 };

    while let Some(item) = stream.try_next().await.map_err(query_error)? {
        match item {
            Either::Right(row) => pending.push(row),
            Either::Left(done) => {
                last = match pending.first() {
                    Some(first) => {
                        let columns = first
                            .columns()
                            .iter()
                            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                            .collect();
                        rows_result(columns, &pending, start)
                    }
                    None => StatementResult::Command {
                        rows_affected: done.rows_affected(),
                    },
                };
                pending.clear();
            }
        }
    }

    Ok(last)
}

fn rows_result(columns: Vec<ColumnInfo>, fetched: &[PgRow], start: Instant) -> StatementResult {
    let rows: Vec<Row> = fetched.iter().map(convert_row).collect();
    StatementResult::Rows(
        QueryResult::with_data(columns, rows).with_execution_time(start.elapsed()),
    )
}

fn is_multiple_commands_error(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|e| e.message().contains("cannot insert multiple commands"))
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute(&self, request: &QueryRequest) -> Result<StatementResult> {
        tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            self.run_in_transaction(request),
        )
        .await
        .map_err(|_| {
            BoardError::query(format!(
                "Query timed out after {QUERY_TIMEOUT_SECS} seconds"
            ))
        })?
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        // SUM over integer columns and AVG come back as NUMERIC
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(index)
            .ok()
            .flatten()
            .and_then(|v| v.to_f64())
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),

        "TIME" => row
            .try_get::<Option<chrono::NaiveTime>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),

        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),

        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_rfc3339()))
            .unwrap_or(Value::Null),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // For all other types, try to get as string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
        || error_str.contains("does not exist")
        || error_str.contains("ssl")
        || error_str.contains("tls")
    {
        return false;
    }

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> BoardError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        BoardError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        BoardError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        BoardError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        BoardError::connection(
            "Server requires SSL. Add '?sslmode=require' to connection string.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        BoardError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        BoardError::connection(error.to_string())
    }
}

/// Builds a query error that carries the store's message unchanged.
///
/// Postgres detail fields go to the log.
fn query_error(error: sqlx::Error) -> BoardError {
    let Some(db_error) = error.as_database_error() else {
        return BoardError::query(error.to_string());
    };

    if let Some(pg_error) = db_error.try_downcast_ref::<PgDatabaseError>() {
        debug!(
            code = pg_error.code(),
            detail = pg_error.detail(),
            hint = pg_error.hint(),
            table = pg_error.table(),
            column = pg_error.column(),
            constraint = pg_error.constraint(),
            "Store rejected statement"
        );
    }

    BoardError::query(db_error.message())
}
