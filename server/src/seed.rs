// kifaru-server/src/seed.rs

//! Sample marketplace data for development databases.

use kifaru_core::auth::hash_password;
use kifaru_core::models::{NewCategory, NewProduct, NewUser, Role};
use kifaru_core::store::{CatalogStore, UserStore};
use kifaru_core::{CartResult, Store};
use tracing::{info, instrument};

struct SeedUser {
  email: &'static str,
  first_name: &'static str,
  last_name: &'static str,
  role: Role,
  business_name: Option<&'static str>,
  bio: Option<&'static str>,
  location: Option<&'static str>,
}

const USERS: &[SeedUser] = &[
  SeedUser {
    email: "customer@kifaru.com",
    first_name: "John",
    last_name: "Doe",
    role: Role::Customer,
    business_name: None,
    bio: None,
    location: None,
  },
  SeedUser {
    email: "vendor@kifaru.com",
    first_name: "Mary",
    last_name: "Wanjiku",
    role: Role::Vendor,
    business_name: Some("Wanjiku Crafts"),
    bio: Some("Traditional Kenyan artisan specializing in wooden crafts"),
    location: Some("Nairobi, Kenya"),
  },
  SeedUser {
    email: "vendor2@kifaru.com",
    first_name: "James",
    last_name: "Mwangi",
    role: Role::Vendor,
    business_name: Some("Mwangi Beadworks"),
    bio: Some("Expert in traditional Maasai beadwork and jewelry"),
    location: Some("Kajiado, Kenya"),
  },
];

pub const SEED_PASSWORD: &str = "password123";

const CATEGORIES: &[(&str, &str)] = &[
  ("Traditional Crafts", "Authentic Kenyan traditional crafts and artifacts"),
  ("Jewelry & Accessories", "Handcrafted jewelry and fashion accessories"),
  ("Textiles", "Traditional fabrics and woven materials"),
  ("Pottery & Ceramics", "Handmade pottery and ceramic items"),
];

struct SeedProduct {
  name: &'static str,
  description: &'static str,
  /// KES cents.
  price_cents: i64,
  image: &'static str,
  category: usize,
  vendor: usize,
  featured: bool,
  badge: Option<&'static str>,
  stock: i32,
}

const PRODUCTS: &[SeedProduct] = &[
  SeedProduct {
    name: "Hand-carved Wooden Mask",
    description: "Traditional Kenyan wooden mask carved by skilled artisans",
    price_cents: 250_000,
    image: "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400",
    category: 0,
    vendor: 1,
    featured: true,
    badge: Some("Bestseller"),
    stock: 15,
  },
  SeedProduct {
    name: "Maasai Beaded Necklace",
    description: "Colorful traditional Maasai beaded necklace",
    price_cents: 80_000,
    image: "https://images.unsplash.com/photo-1515562141207-7a88fb7ce338?w=400",
    category: 1,
    vendor: 2,
    featured: true,
    badge: None,
    stock: 25,
  },
  SeedProduct {
    name: "Kikoy Beach Wrap",
    description: "Traditional Kenyan kikoy perfect for beach or casual wear",
    price_cents: 120_000,
    image: "https://images.unsplash.com/photo-1445205170230-053b83016050?w=400",
    category: 2,
    vendor: 1,
    featured: false,
    badge: None,
    stock: 30,
  },
  SeedProduct {
    name: "Soapstone Elephant",
    description: "Beautiful soapstone elephant sculpture from Kisii",
    price_cents: 150_000,
    image: "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400",
    category: 3,
    vendor: 2,
    featured: true,
    badge: None,
    stock: 12,
  },
];

/// Inserts the sample users, categories and products unless the store already has a seed user.
#[instrument(name = "seed::seed_store", skip_all, fields(backend = store.backend_tag()), err(Display))]
pub async fn seed_store(store: &dyn Store) -> CartResult<bool> {
  if store.find_user_by_email(USERS[0].email).await?.is_some() {
    info!("Sample data already exists.");
    return Ok(false);
  }

  let password_hash = hash_password(SEED_PASSWORD)?;
  let mut users = Vec::with_capacity(USERS.len());
  for seed in USERS {
    let user = store
      .insert_user(NewUser {
        email: seed.email.to_string(),
        password_hash: password_hash.clone(),
        first_name: seed.first_name.to_string(),
        last_name: seed.last_name.to_string(),
        role: seed.role,
        business_name: seed.business_name.map(str::to_string),
        bio: seed.bio.map(str::to_string),
        location: seed.location.map(str::to_string),
        phone: None,
        is_verified: seed.role == Role::Vendor,
      })
      .await?;
    users.push(user);
  }

  let mut categories = Vec::with_capacity(CATEGORIES.len());
  for (name, description) in CATEGORIES {
    let category = store
      .insert_category(NewCategory {
        name: name.to_string(),
        description: Some(description.to_string()),
        image: None,
      })
      .await?;
    categories.push(category);
  }

  for seed in PRODUCTS {
    store
      .insert_product(NewProduct {
        vendor_id: users[seed.vendor].id,
        category_id: categories[seed.category].id,
        name: seed.name.to_string(),
        description: seed.description.to_string(),
        price_cents: seed.price_cents,
        image: seed.image.to_string(),
        stock: seed.stock,
        featured: seed.featured,
        badge: seed.badge.map(str::to_string),
      })
      .await?;
  }

  info!(
    users = users.len(),
    categories = categories.len(),
    products = PRODUCTS.len(),
    "Sample data initialized."
  );
  Ok(true)
}
