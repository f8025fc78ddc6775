// kifaru-server/src/state.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use actix_web::cookie::Key;
use kifaru_core::session::SessionStore;
use kifaru_core::{build_login_pipeline, build_registration_pipeline, CartService, IdentityPipeline, IdentityServices, Store};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub services: IdentityServices,
  pub login_pipeline: Arc<IdentityPipeline>,
  pub register_pipeline: Arc<IdentityPipeline>,
  pub config: Arc<AppConfig>,
  /// Signs and verifies the session cookie.
  pub cookie_key: Key,
}

impl AppState {
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>, sessions: Arc<dyn SessionStore>) -> Result<Self> {
    let cookie_key = Key::try_from(config.session_secret.as_bytes())
      .map_err(|e| AppError::Config(format!("SESSION_SECRET cannot be used as a cookie key: {}", e)))?;
    Ok(Self {
      services: IdentityServices::new(store, sessions),
      login_pipeline: Arc::new(build_login_pipeline()),
      register_pipeline: Arc::new(build_registration_pipeline()),
      config,
      cookie_key,
    })
  }

  pub fn cart(&self) -> &CartService {
    &self.services.cart
  }

  pub fn store(&self) -> &Arc<dyn Store> {
    &self.services.store
  }

  pub fn sessions(&self) -> &Arc<dyn SessionStore> {
    &self.services.sessions
  }
}
