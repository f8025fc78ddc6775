// kifaru-server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse, ResponseError};
use kifaru_core::{CartError, CartSession, OwnerKey};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::session::{commit, save, set_session_cookie, RequestSession};

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i64,
}

fn default_quantity() -> i64 {
  1
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityRequestPayload {
  pub quantity: Option<i64>,
}

/// Owner for a cart mutation. Creates the anonymous token on first use unless logins are required.
fn owner_for_write(app_state: &AppState, session: &mut CartSession) -> Result<OwnerKey, AppError> {
  if app_state.config.cart_require_login && !session.is_authenticated() {
    return Err(CartError::AuthenticationRequired.into());
  }
  Ok(session.resolve_owner())
}

/// Owner for a read or a mutation of existing rows. Never creates a token: no token, no rows.
fn existing_owner(app_state: &AppState, session: &CartSession) -> Result<Option<OwnerKey>, AppError> {
  if app_state.config.cart_require_login && !session.is_authenticated() {
    return Err(CartError::AuthenticationRequired.into());
  }
  Ok(session.current_owner())
}

// --- Handler Implementations ---

#[instrument(name = "handler::get_cart", skip_all)]
pub async fn get_cart_handler(app_state: web::Data<AppState>, session: RequestSession) -> Result<HttpResponse, AppError> {
  let mut session = session.0;
  // Anonymous readers get an empty cart rather than a 401 when logins are required.
  let lines = if app_state.config.cart_require_login && !session.is_authenticated() {
    Vec::new()
  } else {
    match session.current_owner() {
      Some(owner) => app_state.cart().list(&owner).await?,
      None => {
        debug!("No cart owner yet; returning an empty cart.");
        Vec::new()
      }
    }
  };
  let mut response = HttpResponse::Ok().json(lines);
  commit(&app_state, &mut session, &mut response).await?;
  Ok(response)
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, session, req_payload),
  fields(product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  session: RequestSession,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let mut session = session.0;
  let owner = owner_for_write(&app_state, &mut session)?;
  // A newly minted token is stored before any row is written under it, and kept even when the add
  // fails, so the next request reuses it.
  let saved = save(&app_state, &mut session).await?;
  let added = app_state.cart().add(&owner, req_payload.product_id, req_payload.quantity).await;

  let mut response = match added {
    Ok(added) => {
      info!(item_id = %added.line.item.id, created = added.created, "Add to cart successful.");
      HttpResponse::Created().json(added.line)
    }
    Err(err) => AppError::from(err).error_response(),
  };
  if saved {
    set_session_cookie(&app_state, &session, &mut response)?;
  }
  Ok(response)
}

#[instrument(name = "handler::update_cart_item", skip(app_state, session, path, req_payload), fields(item_id = %path.as_ref()))]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  session: RequestSession,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateQuantityRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let mut session = session.0;
  let item_id = path.into_inner();
  let quantity = req_payload
    .quantity
    .ok_or_else(|| CartError::validation("quantity", "Quantity is required."))?;
  let owner = existing_owner(&app_state, &session)?.ok_or_else(|| CartError::NotFound("Cart item".to_string()))?;

  let line = app_state.cart().update_quantity(&owner, item_id, quantity).await?;
  let mut response = HttpResponse::Ok().json(line);
  commit(&app_state, &mut session, &mut response).await?;
  Ok(response)
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, session, path), fields(item_id = %path.as_ref()))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  session: RequestSession,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let mut session = session.0;
  let item_id = path.into_inner();
  let owner = existing_owner(&app_state, &session)?.ok_or_else(|| CartError::NotFound("Cart item".to_string()))?;

  app_state.cart().remove(&owner, item_id).await?;
  let mut response = HttpResponse::Ok().json(json!({"message": "Item removed from cart"}));
  commit(&app_state, &mut session, &mut response).await?;
  Ok(response)
}

#[instrument(name = "handler::clear_cart", skip_all)]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, session: RequestSession) -> Result<HttpResponse, AppError> {
  let mut session = session.0;
  let removed = match existing_owner(&app_state, &session)? {
    Some(owner) => app_state.cart().clear(&owner).await?,
    None => 0,
  };
  let mut response = HttpResponse::Ok().json(json!({"message": "Cart cleared", "removed": removed}));
  commit(&app_state, &mut session, &mut response).await?;
  Ok(response)
}
