//! Stand Capacity Planner: API server and status client.
//!
//! This is the application entry point. It initializes tracing, loads
//! configuration, and then either serves the JSON API over a PostgreSQL pool,
//! serves the status page, or runs a one-off health check from the terminal.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stand_capacity::client::{StatusClient, StatusPanel, StatusView};
use stand_capacity::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use stand_capacity::db::PgStore;
use stand_capacity::frontend::{create_frontend_router, FrontendState};
use stand_capacity::http::{bind_address, start_server};
use stand_capacity::routes::create_router;
use stand_capacity::state::AppState;
use stand_capacity::templates::init_templates;

/// Stand Capacity Planner API server and status client
#[derive(Parser, Debug)]
#[command(name = "stand-capacity", version, about)]
struct Args {
    /// Path to configuration file (optional; defaults and environment apply without it)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "stand_capacity=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API (default)
    Serve,
    /// Fetch /api/health once and print the result
    Check {
        /// API base URL, overrides API_URL
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Serve the status page
    Frontend,
}

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, config.logging.is_json());

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await.map(|()| ExitCode::SUCCESS),
        Command::Check { api_url } => check(config, api_url).await,
        Command::Frontend => frontend(config).await.map(|()| ExitCode::SUCCESS),
    }
}

/// An explicit `--config` must exist; the default path is used only if present.
fn load_config(path: Option<&str>) -> Result<AppConfig, BoxError> {
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => AppConfig::load(DEFAULT_CONFIG_PATH)?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(filter: &str, json: bool) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

async fn serve(config: AppConfig) -> Result<(), BoxError> {
    let addr = bind_address(&config.http.host, config.http.port).await?;

    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        user = %config.database.user,
        "Database pool configured"
    );
    tracing::info!(origin = %config.cors.frontend_url, "CORS origin configured");
    if config.errors.verbose {
        tracing::debug!("Verbose errors enabled: listing failures return driver messages");
    }

    // Pool lives for the whole process and is closed after the server drains
    let store = PgStore::connect_lazy(&config.database);
    let state = AppState::new(config, Arc::new(store.clone()));
    let app = create_router(state);

    let result = start_server(app, addr).await;

    store.close().await;
    tracing::info!("Database pool closed");

    result.map_err(Into::into)
}

async fn check(config: AppConfig, api_url: Option<String>) -> Result<ExitCode, BoxError> {
    let client = match api_url {
        Some(url) => StatusClient::new(url)?,
        None => StatusClient::from_config(&config.client)?,
    };

    let mut panel = StatusPanel::new();
    panel.mount(client);
    println!("{}", panel.view());

    let view = panel.settled().await;
    println!("{}", view);

    Ok(match view {
        StatusView::Success(health) if health.is_database_connected() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn frontend(config: AppConfig) -> Result<(), BoxError> {
    let addr = bind_address(&config.http.host, config.client.listen_port).await?;
    let client = StatusClient::from_config(&config.client)?;
    tracing::info!(api = %client.health_url(), "Status page checks API health");

    let tera = init_templates()?;
    let app = create_frontend_router(FrontendState::new(client, tera));

    start_server(app, addr).await?;
    Ok(())
}
