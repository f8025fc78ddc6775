// kifaru-server/src/db/rows.rs

//! Row shapes as stored, and their conversion into core models.

use chrono::{DateTime, Utc};
use kifaru_core::models::{CartItem, Category, Product, Role, User};
use kifaru_core::{OwnerKey, StoreError};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
  pub id: Uuid,
  pub email: String,
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub role: String,
  pub business_name: Option<String>,
  pub bio: Option<String>,
  pub location: Option<String>,
  pub phone: Option<String>,
  pub is_verified: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
  type Error = StoreError;

  fn try_from(row: UserRow) -> Result<Self, Self::Error> {
    let role: Role = row
      .role
      .parse()
      .map_err(|_| StoreError::Corrupt(format!("user {} has unknown role '{}'", row.id, row.role)))?;
    Ok(User {
      id: row.id,
      email: row.email,
      password_hash: row.password_hash,
      first_name: row.first_name,
      last_name: row.last_name,
      role,
      business_name: row.business_name,
      bio: row.bio,
      location: row.location,
      phone: row.phone,
      is_verified: row.is_verified,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
pub(super) struct CategoryRow {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub image: Option<String>,
}

impl From<CategoryRow> for Category {
  fn from(row: CategoryRow) -> Self {
    Category {
      id: row.id,
      name: row.name,
      description: row.description,
      image: row.image,
    }
  }
}

#[derive(Debug, FromRow)]
pub(super) struct ProductRow {
  pub id: Uuid,
  pub vendor_id: Uuid,
  pub category_id: Uuid,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub image: String,
  pub stock: i32,
  pub featured: bool,
  pub badge: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      vendor_id: row.vendor_id,
      category_id: row.category_id,
      name: row.name,
      description: row.description,
      price_cents: row.price_cents,
      image: row.image,
      stock: row.stock,
      featured: row.featured,
      badge: row.badge,
      is_active: row.is_active,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Debug, FromRow)]
pub(super) struct CartItemRow {
  pub id: Uuid,
  pub owner_key: String,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_at_add_cents: Option<i64>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<CartItemRow> for CartItem {
  type Error = StoreError;

  fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
    let owner = OwnerKey::parse(&row.owner_key)
      .ok_or_else(|| StoreError::Corrupt(format!("cart item {} has bad owner key", row.id)))?;
    Ok(CartItem {
      id: row.id,
      owner,
      product_id: row.product_id,
      quantity: row.quantity,
      price_at_add_cents: row.price_at_add_cents,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}
