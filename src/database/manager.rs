use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use super::postgres::PgStore;
use super::store::{MemoryStore, RecordStore, StoreError};
use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Chooses and prepares the record store for the process.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Postgres when a URL is configured, otherwise an in-memory store.
    pub async fn open(config: &DatabaseConfig) -> Result<(Arc<dyn RecordStore>, Option<PgPool>), DatabaseError> {
        let Some(database_url) = config.url.as_deref() else {
            info!("DATABASE_URL not set, using in-memory record store");
            return Ok((Arc::new(MemoryStore::new()), None));
        };

        url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        let store = PgStore::new(pool.clone());
        store.ensure_schema().await?;

        info!("Connected record store to Postgres");
        Ok((Arc::new(store), Some(pool)))
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
