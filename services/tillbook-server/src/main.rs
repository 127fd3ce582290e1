//! Tillbook Server
//!
//! Multi-tenant bookkeeping API for small stores: businesses, their
//! employees, daily income entries and expenses.
//!
//! # Usage
//!
//! ```bash
//! # Local development with a throwaway secret
//! tillbook-server --dev
//!
//! # Start with custom config
//! tillbook-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! TILLBOOK__SERVER__PORT=8080 TILLBOOK__POLICY__EXPENSE_EDITS_OWNER_ONLY=true tillbook-server
//! ```

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tillbook_api::{create_router, AppState};
use tillbook_auth::AuthService;
use tillbook_db::Database;

use crate::config::{LoggingConfig, MetricsConfig, ServerConfig};

const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tillbook Server - store bookkeeping API
#[derive(Parser, Debug)]
#[command(name = "tillbook-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "TILLBOOK_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "TILLBOOK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TILLBOOK_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TILLBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "TILLBOOK_LOG_FORMAT")]
    log_format: Option<String>,

    /// SQLite connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JWT secret key
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Enable development mode (relaxed security)
    #[arg(long, env = "TILLBOOK_DEV_MODE")]
    dev: bool,
}

impl Args {
    /// Apply CLI overrides on top of the loaded configuration
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.token.secret = secret;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let dev_mode = args.dev;

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut server_config);

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dev_mode,
        "Starting Tillbook server"
    );

    server_config.validate(dev_mode)?;

    tracing::info!(
        day_boundary = ?server_config.policy.day_boundary,
        income_create = ?server_config.policy.income.create,
        expense_create = ?server_config.policy.expense.create,
        expense_edits_owner_only = server_config.policy.expense_edits_owner_only,
        "Policy loaded"
    );

    let db = init_database(&server_config.database).await?;
    let auth = Arc::new(AuthService::new(server_config.auth.clone()));
    spawn_revocation_purge(auth.clone());

    let state = Arc::new(AppState::new(db, auth, server_config.policy));
    let app = create_router(state, server_config.api.clone());

    if server_config.metrics.enabled {
        start_metrics_exporter(&server_config.metrics)?;
    }

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .try_init()?;
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .try_init()?;
        }
    }

    Ok(())
}

/// Connect, migrate and health-check the database
async fn init_database(config: &tillbook_db::DatabaseConfig) -> anyhow::Result<Arc<Database>> {
    let db = Database::connect(config).await?;
    db.migrate().await?;

    let health = db.health_check().await;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(sqlite = health.sqlite, "Database ready");

    Ok(Arc::new(db))
}

/// Periodically forget revoked sessions whose tokens have expired anyway
fn spawn_revocation_purge(auth: Arc<AuthService>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REVOCATION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            auth.jwt.purge_revoked().await;
        }
    });
}

/// Install the Prometheus recorder with its own HTTP listener
fn start_metrics_exporter(config: &MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(port = config.port, "Metrics exporter started");

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
