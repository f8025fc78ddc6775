// kifaru-server/src/web/routes.rs

use actix_web::{error::InternalError, web, HttpRequest, HttpResponse};
use kifaru_core::{CartError, Store};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{auth_handlers, cart_handlers, product_handlers, vendor_handlers};

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "store": app_state.store().backend_tag(),
  }))
}

fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let app_err = AppError::Malformed(err.to_string());
  let response = actix_web::ResponseError::error_response(&app_err);
  InternalError::from_response(err, response).into()
}

// Unparseable ids cannot name a row the caller owns.
fn path_error_handler(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
  let app_err = AppError::Cart(CartError::NotFound("Resource".to_string()));
  let response = actix_web::ResponseError::error_response(&app_err);
  InternalError::from_response(err, response).into()
}

fn query_error_handler(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let app_err = AppError::Malformed(err.to_string());
  let response = actix_web::ResponseError::error_response(&app_err);
  InternalError::from_response(err, response).into()
}

/// Registers every `/api` route plus the JSON/path/query extractor error handlers.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().limit(64 * 1024).error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_check_handler))
        .service(
          web::scope("/auth")
            .route("/register", web::post().to(auth_handlers::register_handler))
            .route("/login", web::post().to(auth_handlers::login_handler))
            .route("/logout", web::post().to(auth_handlers::logout_handler))
            .route("/me", web::get().to(auth_handlers::me_handler)),
        )
        .service(
          web::scope("/cart")
            .route("", web::get().to(cart_handlers::get_cart_handler))
            .route("", web::post().to(cart_handlers::add_to_cart_handler))
            .route("", web::delete().to(cart_handlers::clear_cart_handler))
            .route("/{item_id}", web::put().to(cart_handlers::update_cart_item_handler))
            .route("/{item_id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
        )
        .service(
          web::scope("/products")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
        )
        .service(
          web::scope("/vendors")
            .route("", web::get().to(vendor_handlers::list_vendors_handler))
            .route("/{vendor_id}", web::get().to(vendor_handlers::get_vendor_handler))
            .route("/{vendor_id}/products", web::get().to(vendor_handlers::list_vendor_products_handler)),
        )
        .route("/categories", web::get().to(product_handlers::list_categories_handler)),
    );
}
