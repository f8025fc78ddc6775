// kifaru-core/src/store/memory.rs

//! In-process `Store` used for development, demos and tests.

use super::{CartStore, CatalogStore, Store, StoreResult, UserStore};
use crate::error::StoreError;
use crate::models::{
  CartItem, CartItemId, Category, CategoryId, NewCartItem, NewCategory, NewProduct, NewUser, Product, ProductId,
  ProductQuery, Role, User, UserId,
};
use crate::ownership::OwnerKey;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  users: HashMap<UserId, User>,
  categories: HashMap<CategoryId, Category>,
  products: HashMap<ProductId, Product>,
  cart_items: HashMap<CartItemId, CartItem>,
}

/// All tables behind one lock so every call observes a consistent state.
///
/// Guards are never held across an `.await`: each method takes the lock, does its work
/// synchronously and releases it before returning.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Test and admin helper: overwrite a product's stock.
  pub fn set_stock(&self, product_id: ProductId, stock: i32) -> bool {
    let mut tables = self.tables.write();
    match tables.products.get_mut(&product_id) {
      Some(product) => {
        product.stock = stock;
        product.updated_at = Utc::now();
        true
      }
      None => false,
    }
  }

  /// Test and admin helper: hard-delete a product, leaving any cart rows dangling.
  pub fn delete_product(&self, product_id: ProductId) -> bool {
    self.tables.write().products.remove(&product_id).is_some()
  }

  /// Test and admin helper: soft-delete (deactivate) a product.
  pub fn deactivate_product(&self, product_id: ProductId) -> bool {
    let mut tables = self.tables.write();
    match tables.products.get_mut(&product_id) {
      Some(product) => {
        product.is_active = false;
        true
      }
      None => false,
    }
  }

  pub fn cart_row_count(&self) -> usize {
    self.tables.read().cart_items.len()
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
    let tables = self.tables.read();
    let mut products: Vec<Product> = tables.products.values().filter(|p| query.matches(p)).cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn list_categories(&self) -> StoreResult<Vec<Category>> {
    let tables = self.tables.read();
    let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
  }

  async fn insert_product(&self, new: NewProduct) -> StoreResult<Product> {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      vendor_id: new.vendor_id,
      category_id: new.category_id,
      name: new.name,
      description: new.description,
      price_cents: new.price_cents,
      image: new.image,
      stock: new.stock,
      featured: new.featured,
      badge: new.badge,
      is_active: true,
      created_at: now,
      updated_at: now,
    };
    self.tables.write().products.insert(product.id, product.clone());
    Ok(product)
  }

  async fn insert_category(&self, new: NewCategory) -> StoreResult<Category> {
    let category = Category {
      id: Uuid::new_v4(),
      name: new.name,
      description: new.description,
      image: new.image,
    };
    self.tables.write().categories.insert(category.id, category.clone());
    Ok(category)
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
    Ok(self.tables.read().users.get(&id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let email = email.trim().to_lowercase();
    Ok(self.tables.read().users.values().find(|u| u.email == email).cloned())
  }

  async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
    let email = new.email.trim().to_lowercase();
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.email == email) {
      return Err(StoreError::Conflict(format!("email '{}' is already registered", email)));
    }
    let now = Utc::now();
    let user = User {
      id: Uuid::new_v4(),
      email,
      password_hash: new.password_hash,
      first_name: new.first_name,
      last_name: new.last_name,
      role: new.role,
      business_name: new.business_name,
      bio: new.bio,
      location: new.location,
      phone: new.phone,
      is_verified: new.is_verified,
      created_at: now,
      updated_at: now,
    };
    tables.users.insert(user.id, user.clone());
    Ok(user)
  }

  async fn list_vendors(&self) -> StoreResult<Vec<User>> {
    let tables = self.tables.read();
    let mut vendors: Vec<User> = tables.users.values().filter(|u| u.role == Role::Vendor).cloned().collect();
    vendors.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    Ok(vendors)
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn list_items(&self, owner: &OwnerKey) -> StoreResult<Vec<CartItem>> {
    let tables = self.tables.read();
    let mut items: Vec<CartItem> = tables.cart_items.values().filter(|i| &i.owner == owner).cloned().collect();
    items.sort_by_key(|i| (i.created_at, i.id));
    Ok(items)
  }

  async fn find_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<Option<CartItem>> {
    Ok(self.tables.read().cart_items.get(&id).filter(|i| &i.owner == owner).cloned())
  }

  async fn find_item_for_product(&self, owner: &OwnerKey, product_id: ProductId) -> StoreResult<Option<CartItem>> {
    let tables = self.tables.read();
    Ok(
      tables
        .cart_items
        .values()
        .find(|i| &i.owner == owner && i.product_id == product_id)
        .cloned(),
    )
  }

  async fn insert_item(&self, new: NewCartItem) -> StoreResult<CartItem> {
    let mut tables = self.tables.write();
    if tables
      .cart_items
      .values()
      .any(|i| i.owner == new.owner && i.product_id == new.product_id)
    {
      return Err(StoreError::Conflict(format!(
        "cart {} already holds product {}",
        new.owner, new.product_id
      )));
    }
    let now = Utc::now();
    let item = CartItem {
      id: Uuid::new_v4(),
      owner: new.owner,
      product_id: new.product_id,
      quantity: new.quantity,
      price_at_add_cents: new.price_at_add_cents,
      created_at: now,
      updated_at: now,
    };
    tables.cart_items.insert(item.id, item.clone());
    Ok(item)
  }

  async fn set_quantity(&self, owner: &OwnerKey, id: CartItemId, quantity: i32) -> StoreResult<Option<CartItem>> {
    let mut tables = self.tables.write();
    match tables.cart_items.get_mut(&id) {
      Some(item) if &item.owner == owner => {
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn delete_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<bool> {
    let mut tables = self.tables.write();
    let owned = tables.cart_items.get(&id).is_some_and(|i| &i.owner == owner);
    if owned {
      tables.cart_items.remove(&id);
    }
    Ok(owned)
  }

  async fn delete_all(&self, owner: &OwnerKey) -> StoreResult<u64> {
    let mut tables = self.tables.write();
    let before = tables.cart_items.len();
    tables.cart_items.retain(|_, i| &i.owner != owner);
    Ok((before - tables.cart_items.len()) as u64)
  }
}

impl Store for MemoryStore {
  fn backend_tag(&self) -> &'static str {
    "memory"
  }
}
