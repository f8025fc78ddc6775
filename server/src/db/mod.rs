// kifaru-server/src/db/mod.rs

//! PostgreSQL implementations of the core store and session seams.

mod rows;
pub mod pg_sessions;
pub mod pg_store;

pub use pg_sessions::PgSessionStore;
pub use pg_store::PgStore;

use kifaru_core::StoreError;
use sqlx::PgPool;

/// Connects and brings the schema up to date.
pub async fn connect_and_migrate(database_url: &str) -> anyhow::Result<PgPool> {
  let pool = PgPool::connect(database_url).await?;
  sqlx::migrate!("./migrations").run(&pool).await?;
  tracing::info!("Database connected and migrations applied.");
  Ok(pool)
}

/// Unique violations become `Conflict`; everything else is a backend failure.
pub(crate) fn map_sqlx(err: sqlx::Error, conflict_message: impl FnOnce() -> String) -> StoreError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      return StoreError::Conflict(conflict_message());
    }
  }
  StoreError::backend(err)
}

pub(crate) fn backend(err: sqlx::Error) -> StoreError {
  StoreError::backend(err)
}
