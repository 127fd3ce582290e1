//! Tillbook Database Layer
//!
//! SQLite persistence for accounts, stores and bookkeeping entries.
//!
//! # Repository Pattern
//!
//! Each domain has its own repository with CRUD and domain-specific queries.
//! Uniqueness (usernames, store names per business) is enforced by the
//! schema, so concurrent writers cannot both succeed.

pub mod config;
pub mod error;
pub mod models;
pub mod repos;
mod schema;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;

/// Database connection pool
#[derive(Debug, Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to SQLite: {}", config.url_masked());

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DbError::Connection(format!("Invalid URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("SQLite: {}", e)))?;

        info!("Connected to SQLite");

        Ok(Self { pool })
    }

    /// Private in-memory database with the schema applied
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection(e.to_string()))?
            .foreign_keys(true);

        // one connection that never recycles, or the data disappears
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("SQLite: {}", e)))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the embedded schema
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        for statement in schema::STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::Migration(e.to_string()))?;
        }
        info!("Migrations complete");
        Ok(())
    }

    pub async fn health_check(&self) -> HealthStatus {
        let sqlite = sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok();
        HealthStatus {
            sqlite,
            healthy: sqlite,
        }
    }

    pub fn user_repo(&self) -> UserRepo {
        UserRepo::new(self.pool.clone())
    }

    pub fn store_repo(&self) -> StoreRepo {
        StoreRepo::new(self.pool.clone())
    }

    pub fn income_repo(&self) -> IncomeRepo {
        IncomeRepo::new(self.pool.clone())
    }

    pub fn expense_repo(&self) -> ExpenseRepo {
        ExpenseRepo::new(self.pool.clone())
    }
}

/// Health status of the database connection
#[derive(Debug, Clone, Copy)]
pub struct HealthStatus {
    pub sqlite: bool,
    pub healthy: bool,
}
