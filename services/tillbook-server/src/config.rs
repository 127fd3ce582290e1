//! Server Configuration
//!
//! Layered configuration for the Tillbook server: config files, then
//! `TILLBOOK__*` environment variables, then CLI arguments.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use tillbook_api::ApiConfig;
use tillbook_auth::AuthConfig;
use tillbook_db::DatabaseConfig;
use tillbook_policy::PolicyConfig;

/// Secret used when `--dev` is set and none is configured
const DEV_JWT_SECRET: &str = "tillbook-development-secret-do-not-deploy";

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server binding configuration
    pub server: ServerSettings,

    /// SQLite connection settings
    pub database: DatabaseConfig,

    /// Session tokens and password hashing
    pub auth: AuthConfig,

    /// Date windows and authorization switches
    pub policy: PolicyConfig,

    /// HTTP middleware settings
    pub api: ApiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus exporter
    pub enabled: bool,

    /// Port of the exporter's own listener
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        // TILLBOOK__SERVER__PORT=8080, TILLBOOK__AUTH__TOKEN__SECRET=...
        builder = builder.add_source(
            config::Environment::with_prefix("TILLBOOK")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Check the assembled configuration before anything is started.
    ///
    /// In dev mode a missing JWT secret is replaced with a fixed development
    /// secret and weak auth settings only warn.
    pub fn validate(&mut self, dev_mode: bool) -> anyhow::Result<()> {
        if dev_mode && self.auth.token.secret.is_empty() {
            tracing::warn!("No JWT secret configured, using the development secret");
            self.auth.token.secret = DEV_JWT_SECRET.to_string();
        }

        let mut errors = Vec::new();

        if let Err(auth_errors) = self.auth.validate() {
            if dev_mode {
                for error in &auth_errors {
                    tracing::warn!(%error, "Auth configuration");
                }
            } else {
                errors.extend(auth_errors);
            }
        }

        if let Err(policy_errors) = self.policy.validate() {
            errors.extend(policy_errors);
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            errors.push(format!(
                "Log format must be pretty or json, got {}",
                self.logging.format
            ));
        }

        if self.metrics.enabled && self.metrics.port == self.server.port {
            errors.push("Metrics port must differ from the server port".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Invalid configuration:\n  {}", errors.join("\n  "))
        }
    }
}
