// kifaru-core/src/models/mod.rs

//! Domain records shared by every store backend.

pub mod cart_item;
pub mod category;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, CartLine, NewCartItem, ProductSnapshot};
pub use category::{Category, NewCategory};
pub use product::{NewProduct, Product, ProductQuery};
pub use user::{NewUser, PublicUser, Role, User, VendorProfile};

pub type UserId = uuid::Uuid;
pub type ProductId = uuid::Uuid;
pub type CategoryId = uuid::Uuid;
pub type CartItemId = uuid::Uuid;
