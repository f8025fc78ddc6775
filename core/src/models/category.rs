// kifaru-core/src/models/category.rs

use super::CategoryId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id: CategoryId,
  pub name: String,
  pub description: Option<String>,
  pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
  pub name: String,
  pub description: Option<String>,
  pub image: Option<String>,
}
