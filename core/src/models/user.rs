// kifaru-core/src/models/user.rs

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Customer,
  Vendor,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Customer => "customer",
      Role::Vendor => "vendor",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "customer" => Ok(Role::Customer),
      "vendor" => Ok(Role::Vendor),
      other => Err(format!("unknown role '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: UserId,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Role,
  // Vendor profile; empty for customers.
  pub business_name: Option<String>,
  pub bio: Option<String>,
  pub location: Option<String>,
  pub phone: Option<String>,
  pub is_verified: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// The credential-free view of a user returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
  pub id: UserId,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Role,
  pub business_name: Option<String>,
  pub bio: Option<String>,
  pub location: Option<String>,
  pub is_verified: bool,
}

impl From<&User> for PublicUser {
  fn from(user: &User) -> Self {
    PublicUser {
      id: user.id,
      email: user.email.clone(),
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
      role: user.role,
      business_name: user.business_name.clone(),
      bio: user.bio.clone(),
      location: user.location.clone(),
      is_verified: user.is_verified,
    }
  }
}

/// A vendor's public storefront profile. Leaves out contact details as well as credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
  pub id: UserId,
  pub first_name: String,
  pub last_name: String,
  pub business_name: Option<String>,
  pub bio: Option<String>,
  pub location: Option<String>,
  pub is_verified: bool,
  pub created_at: DateTime<Utc>,
}

impl From<&User> for VendorProfile {
  fn from(user: &User) -> Self {
    VendorProfile {
      id: user.id,
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
      business_name: user.business_name.clone(),
      bio: user.bio.clone(),
      location: user.location.clone(),
      is_verified: user.is_verified,
      created_at: user.created_at,
    }
  }
}

/// Insert payload. `password_hash` is already hashed; stores never see plain passwords.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Role,
  pub business_name: Option<String>,
  pub bio: Option<String>,
  pub location: Option<String>,
  pub phone: Option<String>,
  pub is_verified: bool,
}
