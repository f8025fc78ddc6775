// kifaru-core/src/auth/validation.rs

use crate::error::{CartError, CartResult};
use crate::models::Role;

const MIN_PASSWORD_LEN: usize = 6;

fn normalise_email(raw: &str) -> CartResult<String> {
  let email = raw.trim().to_lowercase();
  let valid = match email.split_once('@') {
    Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
    None => false,
  };
  if !valid {
    return Err(CartError::validation("email", "A valid email is required."));
  }
  Ok(email)
}

#[derive(Debug, Clone)]
pub struct LoginInput {
  pub email: String,
  pub password: String,
}

impl LoginInput {
  /// Normalises the email and rejects obviously malformed input before any store lookup.
  pub fn validate(self) -> CartResult<Self> {
    let email = normalise_email(&self.email)?;
    if self.password.is_empty() {
      return Err(CartError::validation("password", "Password is required."));
    }
    Ok(LoginInput {
      email,
      password: self.password,
    })
  }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
  pub email: String,
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Option<Role>,
  pub business_name: Option<String>,
  pub location: Option<String>,
  pub phone: Option<String>,
}

impl RegistrationInput {
  pub fn validate(self) -> CartResult<Self> {
    let email = normalise_email(&self.email)?;
    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(CartError::validation(
        "password",
        format!("Password must be at least {} characters.", MIN_PASSWORD_LEN),
      ));
    }
    let first_name = self.first_name.trim().to_string();
    if first_name.is_empty() {
      return Err(CartError::validation("firstName", "First name is required."));
    }
    let last_name = self.last_name.trim().to_string();
    if last_name.is_empty() {
      return Err(CartError::validation("lastName", "Last name is required."));
    }
    Ok(RegistrationInput {
      email,
      first_name,
      last_name,
      role: Some(self.role.unwrap_or_default()),
      ..self
    })
  }
}
