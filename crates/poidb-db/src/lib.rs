//! Destination-side persistence: pool bootstrap and the upsert sinks.

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

use poidb_core::AppConfig;

pub mod postgres;
pub mod sink;
pub mod supabase;

pub use postgres::PostgresSink;
pub use sink::{BatchOutcome, PoiSink, SinkError};
pub use supabase::SupabaseSink;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect to a Postgres pool from application config, verifying the
/// connection with a ping so missing or unreachable destinations fail
/// before any dataset work starts.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if the config carries no
/// `DATABASE_URL`, or [`DbError::Sqlx`] if the connection cannot be
/// established.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or(DbError::MissingDatabaseUrl)?;
    let pool = connect_pool(database_url, PoolConfig::from_app_config(config)).await?;
    ping(&pool).await?;
    Ok(pool)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_has_sane_defaults() {
        let config = PoolConfig::default();

        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, DEFAULT_MIN_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }

    #[test]
    fn pool_config_from_app_config_uses_core_values() {
        let app_config = AppConfig {
            database_url: Some("postgres://example".to_owned()),
            supabase_url: None,
            supabase_service_key: None,
            log_level: "info".to_owned(),
            overture_release: "2025-11-19.0".to_owned(),
            s3_region: "us-west-2".to_owned(),
            batch_size: 1000,
            http_timeout_secs: 30,
            db_max_connections: 42,
            db_min_connections: 7,
            db_acquire_timeout_secs: 9,
        };

        let pool_config = PoolConfig::from_app_config(&app_config);
        assert_eq!(pool_config.max_connections, 42);
        assert_eq!(pool_config.min_connections, 7);
        assert_eq!(pool_config.acquire_timeout_secs, 9);
    }
}
