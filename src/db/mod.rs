//! Database abstraction layer for Trendboard.
//!
//! Provides a trait-based interface for the store, so the query gate and the
//! reports can run against PostgreSQL or the in-memory mock interchangeably.

mod demo;
mod mock;
mod postgres;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use types::{
    AccessMode, ColumnInfo, QueryRequest, QueryResult, Row, StatementResult, Value,
};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Connects to PostgreSQL with the given configuration.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with BoardError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Runs one statement and reports whether it produced a result set.
    ///
    /// Each call is one store round trip on one scoped connection. Failed
    /// statements leave no partial changes behind.
    async fn execute(&self, request: &QueryRequest) -> Result<StatementResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
