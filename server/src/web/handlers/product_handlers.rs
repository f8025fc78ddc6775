// kifaru-server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use kifaru_core::models::ProductQuery;
use kifaru_core::store::CatalogStore;
use kifaru_core::CartError;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  pub category: Option<Uuid>,
  pub vendor: Option<Uuid>,
  /// Only `true` filters; anything else lists everything.
  pub featured: Option<String>,
  pub search: Option<String>,
}

impl From<ListProductsQuery> for ProductQuery {
  fn from(q: ListProductsQuery) -> Self {
    ProductQuery {
      category_id: q.category,
      vendor_id: q.vendor,
      featured: q.featured.as_deref().filter(|f| *f == "true").map(|_| true),
      search: q.search,
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let query = ProductQuery::from(query_params.into_inner());
  let products = app_state.store().list_products(&query).await?;
  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match app_state.store().get_product(product_id).await? {
    Some(product) if product.is_available() => Ok(HttpResponse::Ok().json(product)),
    _ => {
      warn!("Product with ID {} not found.", product_id);
      Err(CartError::NotFound("Product".to_string()).into())
    }
  }
}

#[instrument(name = "handler::list_categories", skip_all)]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.store().list_categories().await?;
  Ok(HttpResponse::Ok().json(categories))
}
