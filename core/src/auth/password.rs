// kifaru-core/src/auth/password.rs

//! Argon2 password hashing.

use crate::error::{CartError, CartResult, StoreError};
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password with a fresh random salt and default Argon2 parameters.
#[instrument(name = "auth::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> CartResult<String> {
  if password.is_empty() {
    return Err(CartError::validation("password", "Password cannot be empty."));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(CartError::Store(StoreError::backend(anyhow::anyhow!(
        "password hashing failed: {}",
        argon_err
      ))))
    }
  }
}

/// Checks `provided` against a stored Argon2 hash.
///
/// `Ok(false)` means the password does not match. A stored hash that cannot be parsed is an
/// internal error, not a credential failure.
#[instrument(name = "auth::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> CartResult<bool> {
  if provided.is_empty() {
    return Ok(false);
  }

  let parsed = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Stored password hash is malformed.");
    CartError::Store(StoreError::Corrupt(format!("password hash: {}", parse_err)))
  })?;

  match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other) => {
      error!(error = %other, "Argon2 verification failed.");
      Err(CartError::Store(StoreError::backend(anyhow::anyhow!(
        "password verification failed: {}",
        other
      ))))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("password123").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "password123").unwrap());
    assert!(!verify_password(&hash, "password124").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn empty_password_is_not_hashed() {
    assert!(matches!(
      hash_password(""),
      Err(CartError::Validation { field: "password", .. })
    ));
  }

  #[test]
  fn malformed_stored_hash_is_internal() {
    assert!(matches!(
      verify_password("not-a-hash", "whatever"),
      Err(CartError::Store(StoreError::Corrupt(_)))
    ));
  }
}
