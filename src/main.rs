//! Trendboard - a terminal dashboard for music-streaming trend analysis.

use tracing::{error, info, warn};
use trendboard::app::Dashboard;
use trendboard::cli::Cli;
use trendboard::config::{Config, ConnectionConfig};
use trendboard::error::{BoardError, Result};
use trendboard::headless::{self, HeadlessRequest, EXIT_FAILURE, EXIT_OK};
use trendboard::logging;
use trendboard::session::{AdminSecret, RoleChoice, Session};
use trendboard::tui::{self, App};

/// Connection label shown when running on the demo catalog.
const DEMO_CONNECTION_INFO: &str = "demo catalog (in-memory)";

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();

    if cli.headless {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{e}");
            EXIT_FAILURE
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;
    let admin_secret = config.admin_secret();

    if cli.headless {
        return run_headless(&cli, &config, admin_secret).await;
    }

    cli.validate_headless().map_err(BoardError::config)?;

    let (dashboard, connection_info) = if cli.mock_db {
        (Dashboard::with_demo_data(), DEMO_CONNECTION_INFO.to_string())
    } else {
        let connection = resolve_connection(&cli, &config)?;
        let info = connection.display_string();
        match Dashboard::connect(&connection).await {
            Ok(dashboard) => (dashboard, info),
            Err(e) => {
                error!("Failed to connect: {}", e);
                tui::run(App::blocked(info, e.to_string()), None).await?;
                return Ok(EXIT_FAILURE);
            }
        }
    };

    tui::run(App::new(connection_info, admin_secret), Some(dashboard)).await?;
    Ok(EXIT_OK)
}

async fn run_headless(
    cli: &Cli,
    config: &Config,
    admin_secret: Option<AdminSecret>,
) -> Result<i32> {
    let request = HeadlessRequest::from_cli(cli)?;

    let choice = if cli.admin {
        RoleChoice::Admin
    } else {
        RoleChoice::Analyst
    };
    let start = Session::start(choice, cli.admin_password.as_deref(), admin_secret.as_ref());
    if let Some(warning) = start.warning {
        eprintln!("Warning: {warning}");
    }

    let dashboard = if cli.mock_db {
        Dashboard::with_demo_data()
    } else {
        Dashboard::connect(&resolve_connection(cli, config)?).await?
    };

    let outcome = headless::execute(&dashboard, &start.session, &request).await;
    print!("{}", outcome.render(cli.output));

    if let Err(e) = dashboard.close().await {
        warn!("Error closing database connection: {}", e);
    }

    Ok(outcome.exit_code())
}

/// Resolves the final connection configuration.
///
/// Precedence, highest first: CLI connection string, CLI flags, config file,
/// environment variables, built-in defaults.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = config.connection.clone().unwrap_or_default();

    if let Some(from_cli) = cli.to_connection_config()? {
        if cli.connection_string.is_some() {
            connection = from_cli;
        } else {
            connection.merge(&from_cli);
        }
    }

    connection.apply_env_defaults();
    info!("Connection: {}", connection.display_string());
    Ok(connection)
}
