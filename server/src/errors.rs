// kifaru-server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use kifaru_core::CartError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Cart(#[from] CartError),

  /// The request body or path could not be parsed.
  #[error("Malformed request: {0}")]
  Malformed(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl From<kifaru_core::StoreError> for AppError {
  fn from(err: kifaru_core::StoreError) -> Self {
    AppError::Cart(CartError::Store(err))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Cart(cart_err) => match cart_err {
        CartError::AuthenticationRequired | CartError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        CartError::Validation { .. }
        | CartError::InvalidQuantity { .. }
        | CartError::OutOfStock { .. }
        | CartError::Conflict(_) => StatusCode::BAD_REQUEST,
        CartError::NotFound(_) => StatusCode::NOT_FOUND,
        CartError::Store(_) | CartError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Malformed(_) => StatusCode::BAD_REQUEST,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::info!(status = status.as_u16(), reason = %self, "Request rejected");
    }

    let body = match self {
      AppError::Cart(CartError::Validation { field, message }) => json!({"error": message, "field": field}),
      AppError::Cart(CartError::OutOfStock { available, .. }) => {
        json!({"error": format!("Insufficient stock. Only {} available.", available), "available": available})
      }
      AppError::Cart(cart_err) if !status.is_server_error() => json!({"error": cart_err.to_string()}),
      AppError::Malformed(m) => json!({"error": m}),
      // Server-side detail is logged above, never sent.
      AppError::Sqlx(_) => json!({"error": "Database operation failed"}),
      _ => json!({"error": "An internal error occurred"}),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
