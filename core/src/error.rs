// kifaru-core/src/error.rs

//! Error types shared by the cart repository, the stores and the identity flows.

use crate::models::ProductId;
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by a `Store` backend.
///
/// Backends wrap their native error (sqlx, io, ...) in `Backend` so business logic never
/// depends on which backend is running.
#[derive(Debug, Error)]
pub enum StoreError {
  /// A uniqueness constraint was violated (duplicate email, duplicate cart row).
  #[error("Store conflict: {0}")]
  Conflict(String),

  /// A persisted value could not be turned back into a domain value (e.g. a bad owner key).
  #[error("Corrupt stored value: {0}")]
  Corrupt(String),

  #[error("Store backend failure. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl StoreError {
  pub fn backend(err: impl Into<AnyhowError>) -> Self {
    StoreError::Backend { source: err.into() }
  }
}

/// Framework-level failures of a `Pipeline` run (as opposed to failures of its handlers).
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Step '{step_name}' found its context in an unexpected state: {message}")]
  InvalidState { step_name: String, message: String },
}

/// The error taxonomy of the cart and identity core.
///
/// Owner mismatch is reported as `NotFound`, never as a distinct variant, so callers cannot
/// probe for the existence of another owner's cart rows.
#[derive(Debug, Error)]
pub enum CartError {
  #[error("Authentication required")]
  AuthenticationRequired,

  #[error("Invalid email or password")]
  InvalidCredentials,

  #[error("Validation error on '{field}': {message}")]
  Validation { field: &'static str, message: String },

  #[error("Invalid quantity {quantity}: must be at least 1")]
  InvalidQuantity { quantity: i64 },

  #[error("{0} not found")]
  NotFound(String),

  #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
  OutOfStock {
    product_id: ProductId,
    available: i32,
    requested: i64,
  },

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Store error: {0}")]
  Store(#[from] StoreError),

  #[error("Pipeline error: {0}")]
  Pipeline(#[from] PipelineError),
}

impl CartError {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    CartError::Validation {
      field,
      message: message.into(),
    }
  }

  /// True for errors that describe a problem with the caller's request rather than with the
  /// system. Used by the merge loop to decide the log level of a skipped item.
  pub fn is_client_error(&self) -> bool {
    !matches!(self, CartError::Store(_) | CartError::Pipeline(_))
  }
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;
