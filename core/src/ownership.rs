// kifaru-core/src/ownership.rs

//! Cart ownership keys.
//!
//! A cart row is tagged with the key of whoever owns it: either an anonymous browser session or an
//! authenticated user. The two namespaces are kept apart by the type, and the storage form carries a
//! distinct prefix per variant, so `as_storage_key` is injective and an anonymous token can never be
//! read back as a user key.

use crate::models::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const ANON_PREFIX: &str = "anon_";
const USER_PREFIX: &str = "user_";
const TOKEN_LEN: usize = 32;

/// Unguessable per-browser token identifying an anonymous cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnonToken(String);

impl AnonToken {
  /// 122 random bits from a v4 UUID, rendered as 32 lowercase hex characters.
  pub fn generate() -> Self {
    AnonToken(Uuid::new_v4().simple().to_string())
  }

  /// Accepts exactly the shape produced by `generate`.
  pub fn parse(raw: &str) -> Option<Self> {
    let well_formed =
      raw.len() == TOKEN_LEN && raw.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    well_formed.then(|| AnonToken(raw.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl TryFrom<String> for AnonToken {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    AnonToken::parse(&value).ok_or_else(|| format!("malformed anonymous cart token '{}'", value))
  }
}

impl From<AnonToken> for String {
  fn from(token: AnonToken) -> Self {
    token.0
  }
}

impl fmt::Display for AnonToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Who a cart row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerKey {
  Anonymous(AnonToken),
  Authenticated(UserId),
}

impl OwnerKey {
  pub fn for_user(user_id: UserId) -> Self {
    OwnerKey::Authenticated(user_id)
  }

  pub fn is_anonymous(&self) -> bool {
    matches!(self, OwnerKey::Anonymous(_))
  }

  /// The string persisted in the `owner_key` column / map key.
  pub fn as_storage_key(&self) -> String {
    match self {
      OwnerKey::Anonymous(token) => format!("{}{}", ANON_PREFIX, token.as_str()),
      OwnerKey::Authenticated(user_id) => format!("{}{}", USER_PREFIX, user_id),
    }
  }

  /// Inverse of `as_storage_key`.
  pub fn parse(raw: &str) -> Option<Self> {
    if let Some(token) = raw.strip_prefix(ANON_PREFIX) {
      return AnonToken::parse(token).map(OwnerKey::Anonymous);
    }
    if let Some(id) = raw.strip_prefix(USER_PREFIX) {
      // Only the canonical hyphenated form, so every user has exactly one storage key.
      return Uuid::try_parse(id)
        .ok()
        .filter(|uuid| uuid.hyphenated().to_string() == id)
        .map(OwnerKey::Authenticated);
    }
    None
  }
}

impl fmt::Display for OwnerKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.as_storage_key())
  }
}

impl Serialize for OwnerKey {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.as_storage_key())
  }
}

impl<'de> Deserialize<'de> for OwnerKey {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    OwnerKey::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid owner key '{}'", raw)))
  }
}
