// kifaru-core/src/store/mod.rs

//! The persistence seam.
//!
//! Three narrow traits cover the collaborators the cart core touches; `Store` bundles them so a
//! single `Arc<dyn Store>` can be chosen at startup (memory or PostgreSQL) and handed to every
//! service. Every `CartStore` method is scoped by an `OwnerKey`: there is no way to reach a row
//! without naming its owner.

pub mod memory;

use crate::error::StoreError;
use crate::models::{
  CartItem, CartItemId, Category, NewCartItem, NewCategory, NewProduct, NewUser, Product, ProductId, ProductQuery,
  User, UserId,
};
use crate::ownership::OwnerKey;
use async_trait::async_trait;

pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// Returns the product whether or not it is active; callers decide what inactive means.
  async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;

  /// Active products matching `query`, ordered by name.
  async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>>;

  async fn list_categories(&self) -> StoreResult<Vec<crate::models::Category>>;

  async fn insert_product(&self, product: NewProduct) -> StoreResult<Product>;

  async fn insert_category(&self, category: NewCategory) -> StoreResult<Category>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

  /// `email` is matched case-insensitively.
  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

  /// Fails with `StoreError::Conflict` if the email is already registered.
  async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

  /// Every user with `Role::Vendor`, newest first.
  async fn list_vendors(&self) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  /// All rows of `owner`, oldest first.
  async fn list_items(&self, owner: &OwnerKey) -> StoreResult<Vec<CartItem>>;

  async fn find_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<Option<CartItem>>;

  async fn find_item_for_product(&self, owner: &OwnerKey, product_id: ProductId) -> StoreResult<Option<CartItem>>;

  /// Fails with `StoreError::Conflict` if `owner` already has a row for the product.
  async fn insert_item(&self, item: NewCartItem) -> StoreResult<CartItem>;

  /// Returns `None` if no row `id` belongs to `owner`.
  async fn set_quantity(&self, owner: &OwnerKey, id: CartItemId, quantity: i32) -> StoreResult<Option<CartItem>>;

  /// Returns whether a row was deleted.
  async fn delete_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<bool>;

  /// Returns the number of rows deleted.
  async fn delete_all(&self, owner: &OwnerKey) -> StoreResult<u64>;
}

/// Everything the marketplace core needs from persistence.
pub trait Store: CatalogStore + UserStore + CartStore {
  /// Short label for logs ("memory", "postgres").
  fn backend_tag(&self) -> &'static str;
}
