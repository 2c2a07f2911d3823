//! Gated execution of free-text SQL.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::{is_read_query, QueryOutcome, Rejection, Role};
use crate::db::{DatabaseClient, QueryRequest, StatementResult};

/// Mediates between untrusted SQL text and the store.
///
/// Holds no state of its own: every call is decided from the role and the
/// text alone, and makes at most one store call.
pub struct QueryGate<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> QueryGate<'a> {
    /// Creates a gate in front of the given store.
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Decides whether to run `raw_query` for `role` and classifies the result.
    ///
    /// Blank input and non-`select` text from a restricted role never reach
    /// the store. Anything else is forwarded verbatim exactly once; store
    /// errors come back as [`QueryOutcome::Failed`] with the store's message.
    pub async fn evaluate(&self, role: Role, raw_query: &str) -> QueryOutcome {
        if raw_query.trim().is_empty() {
            debug!("Ignoring empty query");
            return QueryOutcome::Rejected(Rejection::EmptyQuery);
        }

        if role == Role::Restricted && !is_read_query(raw_query) {
            info!(role = %role, "Rejected non-read query");
            return QueryOutcome::Rejected(Rejection::ReadOnlyRole);
        }

        debug!(role = %role, sql = raw_query, "Forwarding query");

        let request = QueryRequest {
            sql: raw_query.to_string(),
            binds: Vec::new(),
            access: role.access_mode(),
        };

        let start = Instant::now();
        let result = self.db.execute(&request).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(StatementResult::Rows(result)) => QueryOutcome::Rows {
                columns: result.column_names(),
                records: result.rows,
            },
            Ok(StatementResult::Command { rows_affected }) => match role {
                Role::Privileged => {
                    info!(rows_affected, "Statement committed");
                    QueryOutcome::Ack
                }
                Role::Restricted => {
                    warn!("Read-only query completed without a result set");
                    QueryOutcome::Rejected(Rejection::ReadOnlyRole)
                }
            },
            Err(e) => QueryOutcome::Failed(e.message().to_string()),
        };

        info!(
            role = %role,
            outcome = outcome.kind(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Query evaluated"
        );

        outcome
    }
}
