// kifaru-core/src/cart/mod.rs

//! The cart repository: owner-scoped CRUD over cart rows with stock checks.
//!
//! `CartService` holds the rules (quantity floor, stock ceiling, one row per product per owner);
//! the `Store` only persists. Every method takes the `OwnerKey` explicitly and never touches rows
//! of any other owner.

pub mod merge;

use crate::error::{CartError, CartResult, StoreError};
use crate::models::{CartItem, CartItemId, CartLine, NewCartItem, Product, ProductId, ProductSnapshot};
use crate::ownership::OwnerKey;
use crate::store::{CartStore, CatalogStore, Store};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub use merge::{rehome_items, MergeReport, SkippedItem};

/// Result of `CartService::add`.
#[derive(Debug, Clone)]
pub struct AddedLine {
  pub line: CartLine,
  /// `true` if a new row was inserted, `false` if an existing row was incremented.
  pub created: bool,
}

#[derive(Clone)]
pub struct CartService {
  store: Arc<dyn Store>,
}

impl CartService {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &Arc<dyn Store> {
    &self.store
  }

  /// All rows of `owner`, each joined with the current product snapshot.
  #[instrument(name = "cart::list", skip(self), fields(owner = %owner), err(Display))]
  pub async fn list(&self, owner: &OwnerKey) -> CartResult<Vec<CartLine>> {
    let items = self.store.list_items(owner).await?;
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
      let product = self.store.get_product(item.product_id).await?;
      lines.push(CartLine {
        product: product.as_ref().map(ProductSnapshot::from),
        item,
      });
    }
    debug!(rows = lines.len(), "Cart listed.");
    Ok(lines)
  }

  /// Adds `quantity` of a product, incrementing the existing row if there is one.
  ///
  /// Stock is checked against the resulting total, not just the delta. If another request inserts
  /// the same (owner, product) row between the lookup and the insert, the add falls through to the
  /// increment path against that row.
  #[instrument(name = "cart::add", skip(self), fields(owner = %owner), err(Display))]
  pub async fn add(&self, owner: &OwnerKey, product_id: ProductId, quantity: i64) -> CartResult<AddedLine> {
    let quantity = positive_quantity(quantity)?;
    let product = self.available_product(product_id).await?;

    let (item, created) = match self.store.find_item_for_product(owner, product_id).await? {
      Some(existing) => (self.increment(owner, &product, existing, quantity).await?, false),
      None => {
        let new_item = NewCartItem {
          owner: owner.clone(),
          product_id,
          quantity: within_stock(&product, quantity)?,
          price_at_add_cents: Some(product.price_cents),
        };
        match self.store.insert_item(new_item).await {
          Ok(inserted) => (inserted, true),
          Err(StoreError::Conflict(reason)) => {
            debug!(product_id = %product_id, %reason, "Row created by a concurrent add; incrementing it instead.");
            let existing = self
              .store
              .find_item_for_product(owner, product_id)
              .await?
              // Inserted and then removed again before this read.
              .ok_or_else(|| CartError::NotFound("Cart item".to_string()))?;
            (self.increment(owner, &product, existing, quantity).await?, false)
          }
          Err(err) => return Err(err.into()),
        }
      }
    };

    info!(
      product_id = %product_id,
      quantity = item.quantity,
      created,
      "Cart item {}.",
      if created { "added" } else { "incremented" }
    );
    Ok(AddedLine {
      line: CartLine {
        item,
        product: Some(ProductSnapshot::from(&product)),
      },
      created,
    })
  }

  async fn increment(&self, owner: &OwnerKey, product: &Product, item: CartItem, quantity: i64) -> CartResult<CartItem> {
    let total = within_stock(product, i64::from(item.quantity).saturating_add(quantity))?;
    self
      .store
      .set_quantity(owner, item.id, total)
      .await?
      // The row vanished between the read and the write (concurrent remove/clear).
      .ok_or_else(|| CartError::NotFound("Cart item".to_string()))
  }

  /// Replaces the quantity of one of `owner`'s rows.
  #[instrument(name = "cart::update_quantity", skip(self), fields(owner = %owner), err(Display))]
  pub async fn update_quantity(&self, owner: &OwnerKey, item_id: CartItemId, quantity: i64) -> CartResult<CartLine> {
    let quantity = positive_quantity(quantity)?;
    let item = self
      .store
      .find_item(owner, item_id)
      .await?
      .ok_or_else(|| CartError::NotFound("Cart item".to_string()))?;
    let product = self.available_product(item.product_id).await?;
    let quantity = within_stock(&product, quantity)?;

    let updated = self
      .store
      .set_quantity(owner, item_id, quantity)
      .await?
      .ok_or_else(|| CartError::NotFound("Cart item".to_string()))?;
    info!(item_id = %item_id, quantity, "Cart item quantity updated.");
    Ok(CartLine {
      item: updated,
      product: Some(ProductSnapshot::from(&product)),
    })
  }

  /// Deletes one row. A row that does not exist and a row owned by someone else are both `NotFound`.
  #[instrument(name = "cart::remove", skip(self), fields(owner = %owner), err(Display))]
  pub async fn remove(&self, owner: &OwnerKey, item_id: CartItemId) -> CartResult<()> {
    if !self.store.delete_item(owner, item_id).await? {
      warn!(item_id = %item_id, "Remove requested for a cart item the owner does not hold.");
      return Err(CartError::NotFound("Cart item".to_string()));
    }
    info!(item_id = %item_id, "Cart item removed.");
    Ok(())
  }

  /// Deletes every row of `owner`. Succeeds on an empty cart.
  #[instrument(name = "cart::clear", skip(self), fields(owner = %owner), err(Display))]
  pub async fn clear(&self, owner: &OwnerKey) -> CartResult<u64> {
    let removed = self.store.delete_all(owner).await?;
    info!(removed, "Cart cleared.");
    Ok(removed)
  }

  async fn available_product(&self, product_id: ProductId) -> CartResult<Product> {
    match self.store.get_product(product_id).await? {
      Some(product) if product.is_available() => Ok(product),
      Some(_) => {
        debug!(product_id = %product_id, "Product is inactive.");
        Err(CartError::NotFound("Product".to_string()))
      }
      None => Err(CartError::NotFound("Product".to_string())),
    }
  }
}

fn positive_quantity(quantity: i64) -> CartResult<i64> {
  if quantity < 1 {
    return Err(CartError::InvalidQuantity { quantity });
  }
  Ok(quantity)
}

/// Checks `requested` against the product's stock and narrows it to the stored width.
fn within_stock(product: &Product, requested: i64) -> CartResult<i32> {
  if requested > i64::from(product.stock) {
    warn!(
      product_id = %product.id,
      available = product.stock,
      requested,
      "Insufficient stock."
    );
    return Err(CartError::OutOfStock {
      product_id: product.id,
      available: product.stock,
      requested,
    });
  }
  // requested <= stock <= i32::MAX here.
  Ok(requested as i32)
}
