//! Mock database clients for testing.
//!
//! Provides an in-memory store that returns registered results, records every
//! request it receives, and behaves like PostgreSQL for read-only transactions.

use super::{demo, DatabaseClient, QueryRequest, QueryResult, StatementResult, Value};
use crate::db::{AccessMode, ColumnInfo};
use crate::error::{BoardError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

type ResponseKey = (String, Vec<String>);

#[derive(Debug, Default)]
struct MockLog {
    requests: Vec<QueryRequest>,
    mutations: Vec<String>,
}

/// A mock database client that returns predefined results.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    responses: HashMap<ResponseKey, StatementResult>,
    log: Mutex<MockLog>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock seeded with the demo streaming catalog.
    pub fn with_demo_data() -> Self {
        let mut client = Self::new();
        for (sql, binds, result) in demo::seed() {
            client
                .responses
                .insert((sql.trim().to_string(), binds), StatementResult::Rows(result));
        }
        client
    }

    /// Registers the result for a statement without parameters.
    pub fn with_response(self, sql: &str, result: StatementResult) -> Self {
        self.with_bound_response(sql, &[], result)
    }

    /// Registers the result for a statement with the given parameters.
    pub fn with_bound_response(
        mut self,
        sql: &str,
        binds: &[&str],
        result: StatementResult,
    ) -> Self {
        let binds = binds.iter().map(|b| b.to_string()).collect();
        self.responses.insert((sql.trim().to_string(), binds), result);
        self
    }

    /// Returns every request received, in order.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.log().requests.clone()
    }

    /// Returns the number of requests received.
    pub fn call_count(&self) -> usize {
        self.log().requests.len()
    }

    /// Returns the SQL of every applied read-write command.
    pub fn mutations(&self) -> Vec<String> {
        self.log().mutations.clone()
    }

    fn log(&self) -> MutexGuard<'_, MockLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fallback(sql: &str) -> StatementResult {
        if sql.trim_start().to_uppercase().starts_with("SELECT") {
            let columns = vec![ColumnInfo::new("result", "text")];
            let rows = vec![vec![Value::String(format!("Mock result for: {}", sql))]];
            StatementResult::Rows(
                QueryResult::with_data(columns, rows).with_execution_time(Duration::from_millis(1)),
            )
        } else {
            StatementResult::Command { rows_affected: 1 }
        }
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute(&self, request: &QueryRequest) -> Result<StatementResult> {
        let mut log = self.log();
        log.requests.push(request.clone());

        let key = (request.sql.trim().to_string(), request.binds.clone());
        let result = self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Self::fallback(&request.sql));

        if let StatementResult::Command { .. } = result {
            match request.access {
                AccessMode::ReadOnly => {
                    let verb = request
                        .sql
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_uppercase();
                    return Err(BoardError::query(format!(
                        "cannot execute {verb} in a read-only transaction"
                    )));
                }
                AccessMode::ReadWrite => log.mutations.push(request.sql.clone()),
            }
        }

        Ok(result)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every statement fails with the same message.
#[derive(Debug)]
pub struct FailingDatabaseClient {
    message: String,
    calls: AtomicUsize,
}

impl FailingDatabaseClient {
    /// Creates a client that fails with the given store message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of statements attempted.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute(&self, _request: &QueryRequest) -> Result<StatementResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BoardError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
