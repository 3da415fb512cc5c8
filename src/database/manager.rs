use std::time::{Duration, Instant};

use sqlx::{pool::PoolConnection, postgres::PgPoolOptions, PgPool, Postgres};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL
    )
"#;

const CREATE_PRODUCTS_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_products_name ON products (name)",
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products (category)",
];

/// Handle to the connection pool.
///
/// Built once at startup and passed to whoever needs it. Repository calls
/// check out a [`PoolConnection`] through [`Database::session`]; the
/// connection goes back to the pool when the guard drops, whichever way the
/// call exits. Call [`Database::close`] on shutdown.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    slow_query_threshold: Option<Duration>,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!(max_connections = config.max_connections, "Created database pool");
        Ok(Self::from_pool(pool, config))
    }

    pub fn from_pool(pool: PgPool, config: &DatabaseConfig) -> Self {
        let slow_query_threshold = config
            .enable_slow_query_warning
            .then(|| Duration::from_millis(config.slow_query_threshold_ms));
        Self { pool, slow_query_threshold }
    }

    /// Check out one connection for the lifetime of a single operation
    pub async fn session(&self) -> Result<PoolConnection<Postgres>, DatabaseError> {
        Ok(self.pool.acquire().await?)
    }

    /// Create the products table and its indexes if they are missing
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        let mut session = self.session().await?;
        sqlx::query(CREATE_PRODUCTS_TABLE).execute(&mut *session).await?;
        for statement in CREATE_PRODUCTS_INDEXES {
            sqlx::query(statement).execute(&mut *session).await?;
        }
        info!("Ensured products table exists");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let mut session = self.session().await?;
        sqlx::query("SELECT 1").execute(&mut *session).await?;
        Ok(())
    }

    /// Log a warning when an operation took longer than the configured threshold
    pub fn observe(&self, operation: &'static str, started: Instant) {
        let Some(threshold) = self.slow_query_threshold else {
            return;
        };
        let elapsed = started.elapsed();
        if elapsed > threshold {
            warn!(operation, elapsed_ms = elapsed.as_millis() as u64, "Slow database operation");
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
