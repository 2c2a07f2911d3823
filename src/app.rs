//! Core orchestrator for Trendboard.
//!
//! Coordinates the store client, the canned reports and the query gate. The
//! terminal UI and headless mode both drive the dashboard through this type.

use crate::config::ConnectionConfig;
use crate::db::{self, DatabaseClient, MockDatabaseClient, QueryRequest, StatementResult};
use crate::error::{BoardError, Result};
use crate::gate::{QueryGate, QueryOutcome};
use crate::reports::{Report, ReportView, TableData, COUNTRIES_SQL};
use crate::session::Session;
use tracing::{debug, info};

/// Shown when a statement without a result set succeeds.
pub const QUERY_SUCCESS: &str = "Query executed successfully!";

/// A one-line message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Something worked.
    Success(String),
    /// Something failed or was refused.
    Error(String),
    /// Neutral information.
    Info(String),
}

impl Notice {
    /// Maps a gate outcome to the notice the user should see, if any.
    pub fn from_outcome(outcome: &QueryOutcome) -> Option<Self> {
        match outcome {
            QueryOutcome::Rows { .. } => None,
            QueryOutcome::Ack => Some(Self::Success(QUERY_SUCCESS.to_string())),
            QueryOutcome::Rejected(rejection) if rejection.is_silent() => None,
            QueryOutcome::Rejected(rejection) => Some(Self::Error(rejection.reason().to_string())),
            QueryOutcome::Failed(message) => {
                Some(Self::Error(format!("Error executing query: {message}")))
            }
        }
    }

    /// Maps an error from a report load.
    pub fn from_error(error: &BoardError) -> Self {
        Self::Error(error.to_string())
    }

    /// The message text.
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Error(m) | Self::Info(m) => m,
        }
    }

    /// Returns true for error notices.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Builds the table view for a gate outcome that produced rows.
pub fn outcome_view(outcome: &QueryOutcome) -> Option<ReportView> {
    match outcome {
        QueryOutcome::Rows { columns, records } => Some(ReportView::for_query(TableData::new(
            columns.clone(),
            records.clone(),
        ))),
        _ => None,
    }
}

/// The dashboard: canned reports plus gated ad-hoc queries over one store.
pub struct Dashboard {
    db: Box<dyn DatabaseClient>,
}

impl Dashboard {
    /// Creates a dashboard over an existing store client.
    pub fn new(db: Box<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// Connects to PostgreSQL.
    pub async fn connect(connection: &ConnectionConfig) -> Result<Self> {
        info!("Connecting to {}", connection.display_string());
        let db = db::connect(connection).await?;
        info!("Connected successfully");
        Ok(Self::new(db))
    }

    /// Creates a dashboard over the built-in demo catalog.
    pub fn with_demo_data() -> Self {
        info!("Using in-memory demo catalog");
        Self::new(Box::new(MockDatabaseClient::with_demo_data()))
    }

    /// Loads a report that takes no parameters.
    pub async fn report(&self, report: Report) -> Result<ReportView> {
        if report == Report::RegionalTrends {
            return Err(BoardError::config(
                "the regional trends report needs a country",
            ));
        }

        let table = self.fetch(QueryRequest::read_only(report.sql())).await?;
        info!(report = %report, rows = table.records.len(), "Report loaded");
        Ok(ReportView::for_report(report, table))
    }

    /// Lists the countries the regional report can be run for.
    pub async fn countries(&self) -> Result<Vec<String>> {
        let table = self.fetch(QueryRequest::read_only(COUNTRIES_SQL)).await?;
        Ok(table
            .records
            .into_iter()
            .filter_map(|record| record.into_iter().next())
            .filter(|value| !value.is_null())
            .map(|value| value.to_display_string())
            .collect())
    }

    /// Loads the regional trends report for one country.
    pub async fn regional_trends(&self, country: &str) -> Result<ReportView> {
        let request = QueryRequest::read_only(Report::RegionalTrends.sql()).bind(country);
        let table = self.fetch(request).await?;
        info!(
            country,
            rows = table.records.len(),
            "Regional trends loaded"
        );
        Ok(ReportView::for_report(Report::RegionalTrends, table))
    }

    /// Runs free-text SQL through the gate under the session's role.
    pub async fn run_query(&self, session: &Session, sql: &str) -> QueryOutcome {
        QueryGate::new(self.db.as_ref())
            .evaluate(session.role(), sql)
            .await
    }

    /// Closes the store connection.
    pub async fn close(&self) -> Result<()> {
        debug!("Closing store connection");
        self.db.close().await
    }

    async fn fetch(&self, request: QueryRequest) -> Result<TableData> {
        match self.db.execute(&request).await? {
            StatementResult::Rows(result) => Ok(TableData::new(result.column_names(), result.rows)),
            StatementResult::Command { .. } => Err(BoardError::internal(
                "report query returned no result set",
            )),
        }
    }
}
