// kifaru-server/src/db/pg_sessions.rs

use super::backend;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use kifaru_core::session::{SessionData, SessionId, SessionStore};
use kifaru_core::{StoreError, StoreResult};
use sqlx::types::Json;
use sqlx::PgPool;

/// Sessions as JSONB rows with a sliding expiry, mirroring `MemorySessionStore`.
pub struct PgSessionStore {
  pool: PgPool,
  ttl: Duration,
}

impl PgSessionStore {
  pub fn new(pool: PgPool, ttl: std::time::Duration) -> Self {
    Self {
      pool,
      ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(7)),
    }
  }
}

#[async_trait]
impl SessionStore for PgSessionStore {
  async fn load(&self, id: &SessionId) -> StoreResult<Option<SessionData>> {
    let row: Option<(Json<SessionData>,)> =
      sqlx::query_as("SELECT data FROM sessions WHERE id = $1 AND expires_at > NOW()")
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
    Ok(row.map(|(Json(data),)| data))
  }

  async fn save(&self, id: &SessionId, data: &SessionData) -> StoreResult<SessionData> {
    let mut stored = data.clone();
    let expires_at = Utc::now() + self.ttl;
    stored.expires_at = Some(expires_at);
    sqlx::query(
      "INSERT INTO sessions (id, data, expires_at) VALUES ($1, $2, $3) \
       ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at",
    )
    .bind(id.as_str())
    .bind(Json(&stored))
    .bind(expires_at)
    .execute(&self.pool)
    .await
    .map_err(|e| StoreError::backend(anyhow::Error::new(e).context("saving session")))?;
    Ok(stored)
  }

  async fn destroy(&self, id: &SessionId) -> StoreResult<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
      .bind(id.as_str())
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    Ok(())
  }

  async fn prune_expired(&self) -> StoreResult<usize> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    Ok(result.rows_affected() as usize)
  }
}
