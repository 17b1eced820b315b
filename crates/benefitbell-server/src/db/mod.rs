//! PostgreSQL persistence
//!
//! - `welfare_details`: detail cache keyed by servId
//! - `push_subscriptions`: push endpoints and their category filters

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub mod details;
pub mod subscriptions;

pub use details::PgDetailStore;
pub use subscriptions::PgSubscriptionStore;

/// Persistence errors shared by the PostgreSQL and in-memory stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Row content could not be mapped onto the domain type
    #[error("Invalid stored record: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub async fn create_pool(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Apply pending migrations from `migrations/`.
pub async fn migrate(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Sqlx(e.into()))?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> StoreResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(StoreError::from)
}
