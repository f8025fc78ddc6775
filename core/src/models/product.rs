// kifaru-core/src/models/product.rs

use super::{CategoryId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vendor's listing. Read-only from the cart's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: ProductId,
  pub vendor_id: UserId,
  pub category_id: CategoryId,
  pub name: String,
  pub description: String,
  /// Unit price in minor currency units (KES cents).
  pub price_cents: i64,
  pub image: String,
  pub stock: i32,
  pub featured: bool,
  pub badge: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// Inactive products behave as if they did not exist for cart purposes.
  pub fn is_available(&self) -> bool {
    self.is_active
  }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
  pub vendor_id: UserId,
  pub category_id: CategoryId,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub image: String,
  pub stock: i32,
  pub featured: bool,
  pub badge: Option<String>,
}

/// Filter for catalogue listings. Empty fields do not constrain the result.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
  pub category_id: Option<CategoryId>,
  pub vendor_id: Option<UserId>,
  pub featured: Option<bool>,
  /// Case-insensitive substring match on name and description.
  pub search: Option<String>,
}

impl ProductQuery {
  pub fn matches(&self, product: &Product) -> bool {
    if !product.is_active {
      return false;
    }
    if self.category_id.is_some_and(|id| id != product.category_id) {
      return false;
    }
    if self.vendor_id.is_some_and(|id| id != product.vendor_id) {
      return false;
    }
    if self.featured.is_some_and(|f| f != product.featured) {
      return false;
    }
    match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
      Some(needle) => {
        let needle = needle.to_lowercase();
        product.name.to_lowercase().contains(&needle) || product.description.to_lowercase().contains(&needle)
      }
      None => true,
    }
  }
}
