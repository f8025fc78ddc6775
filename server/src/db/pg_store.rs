// kifaru-server/src/db/pg_store.rs

use super::rows::{CartItemRow, CategoryRow, ProductRow, UserRow};
use super::{backend, map_sqlx};
use async_trait::async_trait;
use kifaru_core::models::{
  CartItem, CartItemId, Category, NewCartItem, NewCategory, NewProduct, NewUser, Product, ProductId, ProductQuery,
  Role, User, UserId,
};
use kifaru_core::store::{CartStore, CatalogStore, UserStore};
use kifaru_core::{OwnerKey, Store, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, business_name, bio, location, \
                            phone, is_verified, created_at, updated_at";
const PRODUCT_COLUMNS: &str = "id, vendor_id, category_id, name, description, price_cents, image, stock, featured, \
                               badge, is_active, created_at, updated_at";
const CART_COLUMNS: &str = "id, owner_key, product_id, quantity, price_at_add_cents, created_at, updated_at";

/// `Store` over a PostgreSQL pool. Every cart query filters on `owner_key`.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    Ok(row.map(Product::from))
  }

  async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
    let search = query
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")));
    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
      "SELECT {} FROM products \
       WHERE is_active \
         AND ($1::uuid IS NULL OR category_id = $1) \
         AND ($2::uuid IS NULL OR vendor_id = $2) \
         AND ($3::boolean IS NULL OR featured = $3) \
         AND ($4::text IS NULL OR name ILIKE $4 OR description ILIKE $4) \
       ORDER BY name",
      PRODUCT_COLUMNS
    ))
    .bind(query.category_id)
    .bind(query.vendor_id)
    .bind(query.featured)
    .bind(search)
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn list_categories(&self) -> StoreResult<Vec<Category>> {
    let rows: Vec<CategoryRow> = sqlx::query_as("SELECT id, name, description, image FROM categories ORDER BY name")
      .fetch_all(&self.pool)
      .await
      .map_err(backend)?;
    Ok(rows.into_iter().map(Category::from).collect())
  }

  async fn insert_product(&self, new: NewProduct) -> StoreResult<Product> {
    let row: ProductRow = sqlx::query_as(&format!(
      "INSERT INTO products (id, vendor_id, category_id, name, description, price_cents, image, stock, featured, badge) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(new.vendor_id)
    .bind(new.category_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price_cents)
    .bind(&new.image)
    .bind(new.stock)
    .bind(new.featured)
    .bind(&new.badge)
    .fetch_one(&self.pool)
    .await
    .map_err(backend)?;
    Ok(row.into())
  }

  async fn insert_category(&self, new: NewCategory) -> StoreResult<Category> {
    let row: CategoryRow = sqlx::query_as(
      "INSERT INTO categories (id, name, description, image) VALUES ($1, $2, $3, $4) \
       RETURNING id, name, description, image",
    )
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.image)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| map_sqlx(e, || format!("category '{}' already exists", new.name)))?;
    Ok(row.into())
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(User::try_from).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email.trim().to_lowercase())
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(User::try_from).transpose()
  }

  async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
    let email = new.email.trim().to_lowercase();
    let row: UserRow = sqlx::query_as(&format!(
      "INSERT INTO users (id, email, password_hash, first_name, last_name, role, business_name, bio, location, \
       phone, is_verified) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&new.password_hash)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(new.role.as_str())
    .bind(&new.business_name)
    .bind(&new.bio)
    .bind(&new.location)
    .bind(&new.phone)
    .bind(new.is_verified)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| map_sqlx(e, || format!("email '{}' is already registered", email)))?;
    User::try_from(row)
  }

  async fn list_vendors(&self) -> StoreResult<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(&format!(
      "SELECT {} FROM users WHERE role = $1 ORDER BY created_at DESC, id",
      USER_COLUMNS
    ))
    .bind(Role::Vendor.as_str())
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;
    rows.into_iter().map(User::try_from).collect()
  }
}

#[async_trait]
impl CartStore for PgStore {
  async fn list_items(&self, owner: &OwnerKey) -> StoreResult<Vec<CartItem>> {
    let rows: Vec<CartItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM cart_items WHERE owner_key = $1 ORDER BY created_at, id",
      CART_COLUMNS
    ))
    .bind(owner.as_storage_key())
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;
    rows.into_iter().map(CartItem::try_from).collect()
  }

  async fn find_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<Option<CartItem>> {
    let row: Option<CartItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM cart_items WHERE id = $1 AND owner_key = $2",
      CART_COLUMNS
    ))
    .bind(id)
    .bind(owner.as_storage_key())
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    row.map(CartItem::try_from).transpose()
  }

  async fn find_item_for_product(&self, owner: &OwnerKey, product_id: ProductId) -> StoreResult<Option<CartItem>> {
    let row: Option<CartItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM cart_items WHERE owner_key = $1 AND product_id = $2",
      CART_COLUMNS
    ))
    .bind(owner.as_storage_key())
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    row.map(CartItem::try_from).transpose()
  }

  async fn insert_item(&self, new: NewCartItem) -> StoreResult<CartItem> {
    let owner_key = new.owner.as_storage_key();
    let row: CartItemRow = sqlx::query_as(&format!(
      "INSERT INTO cart_items (id, owner_key, product_id, quantity, price_at_add_cents) \
       VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      CART_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&owner_key)
    .bind(new.product_id)
    .bind(new.quantity)
    .bind(new.price_at_add_cents)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| map_sqlx(e, || format!("cart {} already holds product {}", owner_key, new.product_id)))?;
    CartItem::try_from(row)
  }

  async fn set_quantity(&self, owner: &OwnerKey, id: CartItemId, quantity: i32) -> StoreResult<Option<CartItem>> {
    let row: Option<CartItemRow> = sqlx::query_as(&format!(
      "UPDATE cart_items SET quantity = $3, updated_at = NOW() WHERE id = $1 AND owner_key = $2 RETURNING {}",
      CART_COLUMNS
    ))
    .bind(id)
    .bind(owner.as_storage_key())
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    row.map(CartItem::try_from).transpose()
  }

  async fn delete_item(&self, owner: &OwnerKey, id: CartItemId) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND owner_key = $2")
      .bind(id)
      .bind(owner.as_storage_key())
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    Ok(result.rows_affected() > 0)
  }

  async fn delete_all(&self, owner: &OwnerKey) -> StoreResult<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE owner_key = $1")
      .bind(owner.as_storage_key())
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    Ok(result.rows_affected())
  }
}

impl Store for PgStore {
  fn backend_tag(&self) -> &'static str {
    "postgres"
  }
}
