// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use kifaru_core::auth::hash_password;
use kifaru_core::models::{
  CartItem, CartItemId, Category, NewCartItem, NewCategory, NewProduct, NewUser, Product, ProductId, ProductQuery, Role,
  User, UserId,
};
use kifaru_core::store::{CartStore, CatalogStore, UserStore};
use kifaru_core::{
  CartService, IdentityServices, MemorySessionStore, MemoryStore, OwnerKey, Store, StoreError, StoreResult,
};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const CUSTOMER_EMAIL: &str = "nyawiraalvin@gmail.com";
pub const CUSTOMER_PASSWORD: &str = "password123";

/// A seeded memory store: one vendor, one category, three products with stock 5, 8 and 12.
pub struct Fixture {
  pub store: Arc<MemoryStore>,
  pub sessions: Arc<MemorySessionStore>,
  pub cart: CartService,
  pub vendor: User,
  pub customer: User,
  pub category: Category,
  pub product_a: Product,
  pub product_b: Product,
  pub product_c: Product,
}

impl Fixture {
  pub async fn new() -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let vendor = insert_user(&store, "mary.wanjiku@kifaru.com", "vendor123", Role::Vendor).await;
    let customer = insert_user(&store, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, Role::Customer).await;
    let category = store
      .insert_category(NewCategory {
        name: "Jewelry".to_string(),
        description: Some("Handmade jewelry".to_string()),
        image: None,
      })
      .await
      .unwrap();

    let product_a = insert_product(&store, &vendor, &category, "Maasai Beaded Necklace", 450_000, 5).await;
    let product_b = insert_product(&store, &vendor, &category, "Kikoy Beach Wrap", 280_000, 8).await;
    let product_c = insert_product(&store, &vendor, &category, "Soapstone Bowl", 120_000, 12).await;

    let store_dyn: Arc<dyn Store> = store.clone();
    Self {
      cart: CartService::new(store_dyn),
      sessions: Arc::new(MemorySessionStore::default()),
      store,
      vendor,
      customer,
      category,
      product_a,
      product_b,
      product_c,
    }
  }

  pub fn services(&self) -> IdentityServices {
    let store: Arc<dyn Store> = self.store.clone();
    IdentityServices::new(store, self.sessions.clone())
  }

  pub fn customer_key(&self) -> OwnerKey {
    OwnerKey::for_user(self.customer.id)
  }

  /// `(product_id, quantity)` pairs of `owner`'s cart, sorted by product id.
  pub async fn cart_contents(&self, owner: &OwnerKey) -> Vec<(ProductId, i32)> {
    let mut rows: Vec<(ProductId, i32)> = self
      .store
      .list_items(owner)
      .await
      .unwrap()
      .into_iter()
      .map(|item| (item.product_id, item.quantity))
      .collect();
    rows.sort();
    rows
  }
}

pub async fn insert_user(store: &MemoryStore, email: &str, password: &str, role: Role) -> User {
  store
    .insert_user(NewUser {
      email: email.to_string(),
      password_hash: hash_password(password).unwrap(),
      first_name: "Test".to_string(),
      last_name: "User".to_string(),
      role,
      business_name: None,
      bio: None,
      location: Some("Nairobi".to_string()),
      phone: None,
      is_verified: true,
    })
    .await
    .unwrap()
}

pub async fn insert_product(
  store: &MemoryStore,
  vendor: &User,
  category: &Category,
  name: &str,
  price_cents: i64,
  stock: i32,
) -> Product {
  store
    .insert_product(NewProduct {
      vendor_id: vendor.id,
      category_id: category.id,
      name: name.to_string(),
      description: format!("{} made by hand.", name),
      price_cents,
      image: "/images/placeholder.jpg".to_string(),
      stock,
      featured: false,
      badge: None,
    })
    .await
    .unwrap()
}

/// Delegates to a `MemoryStore`, but can be told to fail reads of anonymous carts, or to miss the
/// next per-product row lookup (as if a concurrent add inserted the row right after it).
pub struct FlakyStore {
  pub inner: Arc<MemoryStore>,
  pub fail_anonymous_reads: AtomicBool,
  pub miss_next_product_lookup: AtomicBool,
}

impl FlakyStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      fail_anonymous_reads: AtomicBool::new(false),
      miss_next_product_lookup: AtomicBool::new(false),
    }
  }
}

#[async_trait]
impl CatalogStore for FlakyStore {
  async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
    self.inner.get_product(id).await
  }
  async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
    self.inner.list_products(query).await
  }
  async fn list_categories(&self) -> StoreResult<Vec<Category>> {
    self.inner.list_categories().await
  }
  async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
    self.inner.insert_product(product).await
  }
  async fn insert_category(&self, category: NewCategory) -> StoreResult<Category> {
    self.inner.insert_category(category).await
  }
}

#[async_trait]
impl UserStore for FlakyStore {
  async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
    self.inner.get_user(id).await
  }
  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    self.inner.find_user_by_email(email).await
  }
  async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
    self.inner.insert_user(user).await
  }
  async fn list_vendors(&self) -> StoreResult<Vec<User>> {
    self.inner.list_vendors().await
  }
}

#[async_trait]
impl CartStore for FlakyStore {
  async fn list_items(&self, owner: &OwnerKey) -> StoreResult<Vec<CartItem>> {
    if owner.is_anonymous() && self.fail_anonymous_reads.load(Ordering::SeqCst) {
      return Err(StoreError::backend(anyhow::anyhow!("simulated read failure")));
    }
    self.inner.list_items(owner).await
  }
  async fn find_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<Option<CartItem>> {
    self.inner.find_item(owner, id).await
  }
  async fn find_item_for_product(&self, owner: &OwnerKey, product_id: ProductId) -> StoreResult<Option<CartItem>> {
    if self.miss_next_product_lookup.swap(false, Ordering::SeqCst) {
      return Ok(None);
    }
    self.inner.find_item_for_product(owner, product_id).await
  }
  async fn insert_item(&self, item: NewCartItem) -> StoreResult<CartItem> {
    self.inner.insert_item(item).await
  }
  async fn set_quantity(&self, owner: &OwnerKey, id: CartItemId, quantity: i32) -> StoreResult<Option<CartItem>> {
    self.inner.set_quantity(owner, id, quantity).await
  }
  async fn delete_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<bool> {
    self.inner.delete_item(owner, id).await
  }
  async fn delete_all(&self, owner: &OwnerKey) -> StoreResult<u64> {
    self.inner.delete_all(owner).await
  }
}

impl Store for FlakyStore {
  fn backend_tag(&self) -> &'static str {
    "flaky"
  }
}
