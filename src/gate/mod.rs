//! Query gate: decides whether free-text SQL may reach the store.
//!
//! Restricted sessions may only run statements that start with `select`;
//! privileged sessions may run anything. The gate classifies what the store
//! reports into a [`QueryOutcome`].

mod executor;

pub use executor::QueryGate;

use crate::db::{AccessMode, Row};
use std::fmt;

/// Permission level of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Read queries only.
    Restricted,
    /// Any statement, forwarded verbatim.
    Privileged,
}

impl Role {
    /// Transaction access mode used for this role's queries.
    pub fn access_mode(&self) -> AccessMode {
        match self {
            Self::Restricted => AccessMode::ReadOnly,
            Self::Privileged => AccessMode::ReadWrite,
        }
    }

    /// Short label for headers and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restricted => "read-only",
            Self::Privileged => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why the gate refused to forward a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Blank input. Treated as a no-op.
    EmptyQuery,
    /// A restricted session tried something other than a read query.
    ReadOnlyRole,
}

impl Rejection {
    /// The user-facing reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "empty query",
            Self::ReadOnlyRole => "restricted role: only read queries permitted",
        }
    }

    /// Whether the rejection should be shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Result of passing a query through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The store returned a result set.
    Rows {
        /// Column names in store order.
        columns: Vec<String>,
        /// Records in store order.
        records: Vec<Row>,
    },
    /// The statement succeeded without a result set and was committed.
    Ack,
    /// The gate did not forward the query.
    Rejected(Rejection),
    /// The store reported an error; the message is kept verbatim.
    Failed(String),
}

impl QueryOutcome {
    /// Short name used in logs and machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rows { .. } => "rows",
            Self::Ack => "ack",
            Self::Rejected(_) => "rejected",
            Self::Failed(_) => "failed",
        }
    }
}

/// Returns true if the trimmed query starts with `select`, ignoring case.
///
/// This is a prefix check only: a leading comment or a `WITH` clause makes a
/// read query look like a write.
pub fn is_read_query(sql: &str) -> bool {
    sql.trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
}
