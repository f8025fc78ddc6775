// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use kifaru_core::models::Product;
use kifaru_core::store::CatalogStore;
use kifaru_core::{MemorySessionStore, MemoryStore, SessionStore, Store};
use kifaru_server::config::AppConfig;
use kifaru_server::state::AppState;
use kifaru_server::web::session::SESSION_COOKIE;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const CUSTOMER_EMAIL: &str = "customer@kifaru.com";
pub const PASSWORD: &str = kifaru_server::seed::SEED_PASSWORD;

/// Memory-backed state with the sample catalogue loaded.
pub struct TestApp {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
}

impl TestApp {
  pub async fn new() -> Self {
    Self::with_config(AppConfig::for_tests()).await
  }

  pub async fn with_config(config: AppConfig) -> Self {
    let sessions = Arc::new(MemorySessionStore::new(config.session_ttl));
    Self::with_sessions(config, sessions).await
  }

  pub async fn with_sessions(config: AppConfig, sessions: Arc<dyn SessionStore>) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    kifaru_server::seed::seed_store(store.as_ref()).await.unwrap();
    let store_dyn: Arc<dyn Store> = store.clone();
    let state = AppState::new(Arc::new(config), store_dyn, sessions).unwrap();
    Self { state, store }
  }

  pub async fn product(&self, name: &str) -> Product {
    self
      .store
      .list_products(&Default::default())
      .await
      .unwrap()
      .into_iter()
      .find(|p| p.name == name)
      .unwrap_or_else(|| panic!("seed product '{}' missing", name))
  }
}

/// Builds the service under test from a `TestApp`'s state.
#[macro_export]
macro_rules! init_app {
  ($test_app:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($test_app.state.clone()))
        .configure(kifaru_server::web::configure_app_routes),
    )
    .await
  };
}

/// The session cookie set by `resp`, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
  resp
    .response()
    .cookies()
    .find(|c| c.name() == SESSION_COOKIE)
    .map(|c| c.into_owned())
}
