// kifaru-server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Used when `SESSION_SECRET` is unset. Fine for local development only.
const DEV_SESSION_SECRET: &str = "kifaru-dev-session-secret-change-me-kifaru-dev-session-secret-change-me";
const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Memory,
  Postgres,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "memory" => Ok(StoreBackend::Memory),
      "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
      other => Err(AppError::Config(format!(
        "Invalid STORE_BACKEND '{}': expected 'memory' or 'postgres'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl LogFormat {
  /// Read on its own so logging can be set up before the rest of the configuration loads.
  pub fn from_env() -> Self {
    dotenv().ok();
    match env::var("LOG_FORMAT") {
      Ok(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Text,
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub session_secret: String,
  pub session_ttl: Duration,
  pub session_prune_interval: Duration,
  pub cookie_secure: bool,
  /// When set, anonymous visitors get an empty cart and cannot mutate it.
  pub cart_require_login: bool,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

// Keeps the secret and the database credentials out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("store_backend", &self.store_backend)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("session_secret", &"[REDACTED]")
      .field("session_ttl", &self.session_ttl)
      .field("session_prune_interval", &self.session_prune_interval)
      .field("cookie_secure", &self.cookie_secure)
      .field("cart_require_login", &self.cart_require_login)
      .field("seed_db", &self.seed_db)
      .field("log_format", &self.log_format)
      .finish()
  }
}

fn parse_var<T: FromStr>(name: &str, raw: String) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|| "5000".to_string()))?;

    let store_backend: StoreBackend = get_env("STORE_BACKEND").unwrap_or_else(|| "memory".to_string()).parse()?;
    let database_url = get_env("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required when STORE_BACKEND=postgres)".to_string(),
      ));
    }

    let session_secret = match get_env("SESSION_SECRET") {
      Some(secret) if secret.len() >= MIN_SESSION_SECRET_LEN => secret,
      Some(_) => {
        return Err(AppError::Config(format!(
          "SESSION_SECRET must be at least {} bytes",
          MIN_SESSION_SECRET_LEN
        )))
      }
      None => {
        tracing::warn!("SESSION_SECRET is not set; using the development secret. Do not run like this in production.");
        DEV_SESSION_SECRET.to_string()
      }
    };

    let session_ttl_secs: u64 = parse_var(
      "SESSION_TTL_SECS",
      get_env("SESSION_TTL_SECS").unwrap_or_else(|| "604800".to_string()),
    )?;
    let prune_secs: u64 = parse_var(
      "SESSION_PRUNE_INTERVAL_SECS",
      get_env("SESSION_PRUNE_INTERVAL_SECS").unwrap_or_else(|| "86400".to_string()),
    )?;
    if session_ttl_secs == 0 || prune_secs == 0 {
      return Err(AppError::Config(
        "SESSION_TTL_SECS and SESSION_PRUNE_INTERVAL_SECS must be positive".to_string(),
      ));
    }

    let cookie_secure = parse_var("COOKIE_SECURE", get_env("COOKIE_SECURE").unwrap_or_else(|| "false".to_string()))?;
    let cart_require_login = parse_var(
      "CART_REQUIRE_LOGIN",
      get_env("CART_REQUIRE_LOGIN").unwrap_or_else(|| "false".to_string()),
    )?;

    let seed_default = if store_backend == StoreBackend::Memory { "true" } else { "false" };
    let seed_db = parse_var("SEED_DB", get_env("SEED_DB").unwrap_or_else(|| seed_default.to_string()))?;

    let log_format = LogFormat::from_env();

    let config = Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      session_secret,
      session_ttl: Duration::from_secs(session_ttl_secs),
      session_prune_interval: Duration::from_secs(prune_secs),
      cookie_secure,
      cart_require_login,
      seed_db,
      log_format,
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }

  /// Defaults for in-process tests: memory backend, no seeding, short-lived secret.
  pub fn for_tests() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      store_backend: StoreBackend::Memory,
      database_url: None,
      session_secret: DEV_SESSION_SECRET.to_string(),
      session_ttl: Duration::from_secs(3600),
      session_prune_interval: Duration::from_secs(3600),
      cookie_secure: false,
      cart_require_login: false,
      seed_db: false,
      log_format: LogFormat::Text,
    }
  }
}
