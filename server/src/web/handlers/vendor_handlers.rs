// kifaru-server/src/web/handlers/vendor_handlers.rs

//! Read-only vendor storefront endpoints.

use actix_web::{web, HttpResponse};
use kifaru_core::models::{ProductQuery, Role, User, UserId, VendorProfile};
use kifaru_core::store::{CatalogStore, UserStore};
use kifaru_core::CartError;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

async fn find_vendor(app_state: &AppState, vendor_id: UserId) -> Result<User, AppError> {
  match app_state.store().get_user(vendor_id).await? {
    Some(user) if user.role == Role::Vendor => Ok(user),
    _ => {
      warn!("Vendor with ID {} not found.", vendor_id);
      Err(CartError::NotFound("Vendor".to_string()).into())
    }
  }
}

#[instrument(name = "handler::list_vendors", skip_all)]
pub async fn list_vendors_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let vendors = app_state.store().list_vendors().await?;
  info!("Successfully fetched {} vendors.", vendors.len());
  let profiles: Vec<VendorProfile> = vendors.iter().map(VendorProfile::from).collect();
  Ok(HttpResponse::Ok().json(profiles))
}

#[instrument(name = "handler::get_vendor", skip(app_state, path), fields(vendor_id = %path.as_ref()))]
pub async fn get_vendor_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let vendor = find_vendor(&app_state, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(VendorProfile::from(&vendor)))
}

#[instrument(name = "handler::list_vendor_products", skip(app_state, path), fields(vendor_id = %path.as_ref()))]
pub async fn list_vendor_products_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let vendor = find_vendor(&app_state, path.into_inner()).await?;
  let query = ProductQuery {
    vendor_id: Some(vendor.id),
    ..Default::default()
  };
  let products = app_state.store().list_products(&query).await?;
  Ok(HttpResponse::Ok().json(products))
}
