// kifaru-core/src/session/memory.rs

use super::{SessionData, SessionId, SessionStore};
use crate::store::StoreResult;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Process-local session store with a sliding expiry.
pub struct MemorySessionStore {
  sessions: RwLock<HashMap<SessionId, SessionData>>,
  ttl: Duration,
}

impl MemorySessionStore {
  pub fn new(ttl: std::time::Duration) -> Self {
    Self {
      sessions: RwLock::new(HashMap::new()),
      // Out-of-range TTLs fall back to the one-week default.
      ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(7)),
    }
  }

  pub fn len(&self) -> usize {
    self.sessions.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.read().is_empty()
  }
}

impl Default for MemorySessionStore {
  fn default() -> Self {
    Self::new(std::time::Duration::from_secs(7 * 24 * 60 * 60))
  }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
  async fn load(&self, id: &SessionId) -> StoreResult<Option<SessionData>> {
    let now = Utc::now();
    let found = self.sessions.read().get(id).cloned();
    match found {
      Some(data) if data.expires_at.is_some_and(|at| at <= now) => {
        self.sessions.write().remove(id);
        debug!(session_id = %id, "Expired session dropped on load.");
        Ok(None)
      }
      other => Ok(other),
    }
  }

  async fn save(&self, id: &SessionId, data: &SessionData) -> StoreResult<SessionData> {
    let mut stored = data.clone();
    stored.expires_at = Some(Utc::now() + self.ttl);
    self.sessions.write().insert(id.clone(), stored.clone());
    Ok(stored)
  }

  async fn destroy(&self, id: &SessionId) -> StoreResult<()> {
    self.sessions.write().remove(id);
    Ok(())
  }

  async fn prune_expired(&self) -> StoreResult<usize> {
    let now = Utc::now();
    let mut sessions = self.sessions.write();
    let before = sessions.len();
    sessions.retain(|_, data| data.expires_at.map_or(true, |at| at > now));
    Ok(before - sessions.len())
  }
}
