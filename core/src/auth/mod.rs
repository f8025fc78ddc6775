// kifaru-core/src/auth/mod.rs

//! Credential handling: password hashing and input validation for login and registration.

pub mod password;
pub mod validation;

pub use password::{hash_password, verify_password};
pub use validation::{LoginInput, RegistrationInput};
