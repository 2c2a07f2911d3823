//! Headless mode: run one report or query and print the result.
//!
//! Used for scripting and tests. Text output renders the same table as the
//! terminal UI plus a text bar chart; JSON output is a single object tagged
//! by `outcome`.

use crate::app::{outcome_view, Dashboard, Notice};
use crate::cli::{Cli, OutputFormat};
use crate::db::Value;
use crate::error::{BoardError, Result};
use crate::gate::{QueryOutcome, Rejection};
use crate::reports::{BarSeries, Report, ReportView, TableData};
use crate::session::Session;
use crate::tui::widgets::table::ResultTable;
use serde::Serialize;
use tracing::error;

/// Width used for text tables.
const TEXT_WIDTH: usize = 100;

/// Width of the longest text bar.
const CHART_WIDTH: usize = 40;

/// Exit code for success, including an ignored empty query.
pub const EXIT_OK: i32 = 0;

/// Exit code for store or connection failures.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a query refused by the restricted role.
pub const EXIT_PERMISSION_DENIED: i32 = 2;

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlessRequest {
    /// A canned report; regional trends without a country lists countries.
    Report(Report, Option<String>),
    /// Free-text SQL through the gate.
    Query(String),
}

impl HeadlessRequest {
    /// Builds the request from validated CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        cli.validate_headless().map_err(BoardError::config)?;

        match (&cli.report, &cli.query) {
            (Some(report), None) => Ok(Self::Report(*report, cli.country.clone())),
            (None, Some(sql)) => Ok(Self::Query(sql.clone())),
            _ => Err(BoardError::config(
                "--headless requires --report or --query",
            )),
        }
    }
}

/// Result of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessOutcome {
    /// A report or country list loaded.
    View(ReportView),
    /// A gated query finished.
    Query(QueryOutcome),
    /// A report could not be loaded.
    LoadFailed(String),
}

impl HeadlessOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::View(_) => EXIT_OK,
            Self::Query(QueryOutcome::Rows { .. } | QueryOutcome::Ack) => EXIT_OK,
            Self::Query(QueryOutcome::Rejected(Rejection::EmptyQuery)) => EXIT_OK,
            Self::Query(QueryOutcome::Rejected(Rejection::ReadOnlyRole)) => EXIT_PERMISSION_DENIED,
            Self::Query(QueryOutcome::Failed(_)) | Self::LoadFailed(_) => EXIT_FAILURE,
        }
    }

    /// Renders the outcome in the requested format.
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => self.render_json(),
        }
    }

    fn render_text(&self) -> String {
        match self {
            Self::View(view) => view_text(view),
            Self::Query(outcome) => {
                let mut out = outcome_view(outcome)
                    .map(|view| view_text(&view))
                    .unwrap_or_default();
                if let Some(notice) = Notice::from_outcome(outcome) {
                    out.push_str(notice.message());
                    out.push('\n');
                }
                out
            }
            Self::LoadFailed(message) => format!("Error executing query: {message}\n"),
        }
    }

    fn render_json(&self) -> String {
        let query_view = match self {
            Self::Query(outcome) => outcome_view(outcome),
            _ => None,
        };

        let output = match self {
            Self::View(view) => JsonOutput::rows(view),
            Self::Query(outcome) => match outcome {
                QueryOutcome::Rows { .. } => match &query_view {
                    Some(view) => JsonOutput::rows(view),
                    None => JsonOutput::Failed {
                        message: "missing result set".to_string(),
                    },
                },
                QueryOutcome::Ack => JsonOutput::Ack {
                    message: crate::app::QUERY_SUCCESS.to_string(),
                },
                QueryOutcome::Rejected(rejection) => JsonOutput::Rejected {
                    reason: rejection.reason().to_string(),
                },
                QueryOutcome::Failed(message) => JsonOutput::Failed {
                    message: message.clone(),
                },
            },
            Self::LoadFailed(message) => JsonOutput::Failed {
                message: message.clone(),
            },
        };

        match serde_json::to_string_pretty(&output) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                error!("Failed to serialize output: {}", e);
                format!("{{\"outcome\": \"failed\", \"message\": \"{e}\"}}\n")
            }
        }
    }
}

fn view_text(view: &ReportView) -> String {
    let mut lines = vec![view.title.clone(), String::new()];
    lines.extend(ResultTable::new(&view.table).to_text_lines(TEXT_WIDTH));

    if let Some(chart) = &view.chart {
        lines.push(String::new());
        lines.push(format!("{} by {}", chart.value_label, chart.category_label));
        lines.extend(chart.to_text_lines(CHART_WIDTH));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
enum JsonOutput<'a> {
    Rows {
        title: String,
        columns: Vec<String>,
        records: Vec<Vec<serde_json::Value>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        chart: Option<&'a BarSeries>,
    },
    Ack {
        message: String,
    },
    Rejected {
        reason: String,
    },
    Failed {
        message: String,
    },
}

impl<'a> JsonOutput<'a> {
    fn rows(view: &'a ReportView) -> Self {
        Self::Rows {
            title: view.title.clone(),
            columns: view.table.columns.clone(),
            records: view
                .table
                .records
                .iter()
                .map(|record| record.iter().map(Value::to_json).collect())
                .collect(),
            chart: view.chart.as_ref(),
        }
    }
}

/// Runs one headless request against the dashboard.
pub async fn execute(
    dashboard: &Dashboard,
    session: &Session,
    request: &HeadlessRequest,
) -> HeadlessOutcome {
    let loaded = match request {
        HeadlessRequest::Query(sql) => {
            return HeadlessOutcome::Query(dashboard.run_query(session, sql).await)
        }
        HeadlessRequest::Report(Report::RegionalTrends, Some(country)) => {
            dashboard.regional_trends(country).await
        }
        HeadlessRequest::Report(Report::RegionalTrends, None) => {
            dashboard.countries().await.map(country_view)
        }
        HeadlessRequest::Report(report, _) => dashboard.report(*report).await,
    };

    match loaded {
        Ok(view) => HeadlessOutcome::View(view),
        Err(e) => {
            error!("Report failed: {}", e);
            HeadlessOutcome::LoadFailed(e.message().to_string())
        }
    }
}

fn country_view(countries: Vec<String>) -> ReportView {
    let records = countries.into_iter().map(|c| vec![Value::String(c)]).collect();
    ReportView {
        title: "Select a Country".to_string(),
        table: TableData::new(vec!["Country".to_string()], records),
        chart: None,
    }
}
