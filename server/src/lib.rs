// kifaru-server/src/lib.rs

//! HTTP surface for the Kifaru Crafts marketplace: auth, cart and catalogue endpoints over
//! `kifaru-core`, with a memory or PostgreSQL backend picked at startup.

pub mod config;
pub mod db;
pub mod errors;
pub mod seed;
pub mod state;
pub mod web;

use crate::config::{AppConfig, StoreBackend};
use crate::errors::Result;
use crate::state::AppState;
use kifaru_core::session::SessionStore;
use kifaru_core::{MemorySessionStore, MemoryStore, Store};
use std::sync::Arc;

/// Builds the store and session backends named by `config`, seeding the store if asked to.
pub async fn build_state(config: Arc<AppConfig>) -> Result<AppState> {
  let (store, sessions): (Arc<dyn Store>, Arc<dyn SessionStore>) = match config.store_backend {
    StoreBackend::Memory => (
      Arc::new(MemoryStore::new()),
      Arc::new(MemorySessionStore::new(config.session_ttl)),
    ),
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| errors::AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
      let pool = db::connect_and_migrate(url).await?;
      (
        Arc::new(db::PgStore::new(pool.clone())),
        Arc::new(db::PgSessionStore::new(pool, config.session_ttl)),
      )
    }
  };
  tracing::info!(backend = store.backend_tag(), "Store backend ready.");

  if config.seed_db {
    seed::seed_store(store.as_ref()).await?;
  }

  AppState::new(config, store, sessions)
}

/// Drops expired sessions every `interval` until the process exits.
pub fn spawn_session_pruner(sessions: Arc<dyn SessionStore>, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // The first tick completes immediately.
    loop {
      ticker.tick().await;
      match sessions.prune_expired().await {
        Ok(pruned) => tracing::info!(pruned, "Expired sessions pruned."),
        Err(e) => tracing::warn!(error = %e, "Session pruning failed."),
      }
    }
  })
}
