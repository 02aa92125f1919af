//! Odolog Database Library
//!
//! Persistence layer for upload sessions and committed submissions: the
//! store traits, a PostgreSQL implementation, and an in-memory
//! implementation for tests.

pub mod db;

use odolog_core::{AppError, Config};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub use db::memory::MemorySubmissionStore;
pub use db::postgres::PgSubmissionStore;
pub use db::traits::{SessionStore, SubmissionCommitter};
pub use db::transaction::TransactionGuard;

/// Create a connection pool from configuration.
pub async fn create_pool(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .connect(config.database_url())
        .await?;

    Ok(pool)
}

/// Run embedded migrations to bring the schema up to date.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

    tracing::info!("database migrations applied");
    Ok(())
}
