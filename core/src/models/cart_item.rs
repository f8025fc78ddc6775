// kifaru-core/src/models/cart_item.rs

use super::{CartItemId, Product, ProductId};
use crate::ownership::OwnerKey;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of a cart. At most one row exists per (owner, product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub id: CartItemId,
  // Carries the anonymous token; not echoed back in responses.
  #[serde(skip_serializing)]
  pub owner: OwnerKey,
  pub product_id: ProductId,
  /// Always >= 1.
  pub quantity: i32,
  /// Unit price when the row was first created.
  pub price_at_add_cents: Option<i64>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCartItem {
  pub owner: OwnerKey,
  pub product_id: ProductId,
  pub quantity: i32,
  pub price_at_add_cents: Option<i64>,
}

/// The live product fields shown next to a cart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
  pub name: String,
  pub price_cents: i64,
  pub image: String,
  pub stock: i32,
}

impl From<&Product> for ProductSnapshot {
  fn from(product: &Product) -> Self {
    ProductSnapshot {
      name: product.name.clone(),
      price_cents: product.price_cents,
      image: product.image.clone(),
      stock: product.stock,
    }
  }
}

/// A cart row joined with its product. `product` is `None` when the product has been deleted
/// since the row was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  #[serde(flatten)]
  pub item: CartItem,
  pub product: Option<ProductSnapshot>,
}
