// tests/http_cart_tests.rs
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use async_trait::async_trait;
use kifaru_core::session::{SessionData, SessionId, SessionStore};
use kifaru_core::store::UserStore;
use kifaru_core::{StoreError, StoreResult};
use std::sync::Arc;
use kifaru_server::config::AppConfig;
use serde_json::{json, Value};
use serial_test::serial;

#[actix_web::test]
#[serial]
async fn anonymous_add_issues_a_cookie_and_the_cart_follows_it() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);
  let mask = test_app.product("Hand-carved Wooden Mask").await;

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": mask.id, "quantity": 2}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let cookie = session_cookie(&resp).expect("session cookie issued");
  assert!(cookie.http_only().unwrap_or(false));
  let line: Value = test::read_body_json(resp).await;
  assert_eq!(line["quantity"], 2);
  assert_eq!(line["priceAtAddCents"], 250_000);
  assert!(line.get("owner").is_none());

  let req = test::TestRequest::get().uri("/api/cart").cookie(cookie.clone()).to_request();
  let cart: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0]["product"]["name"], "Hand-carved Wooden Mask");

  // Another browser sees nothing.
  let req = test::TestRequest::get().uri("/api/cart").to_request();
  let cart: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert!(cart.is_empty());
}

#[actix_web::test]
#[serial]
async fn repeated_add_returns_created_with_merged_quantity() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);
  let wrap = test_app.product("Kikoy Beach Wrap").await;

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": wrap.id}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  let cookie = session_cookie(&resp).unwrap();

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .cookie(cookie.clone())
    .set_json(json!({"productId": wrap.id, "quantity": 4}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let line: Value = test::read_body_json(resp).await;
  assert_eq!(line["quantity"], 5);
}

#[actix_web::test]
#[serial]
async fn cart_mutations_report_specific_failures() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);
  let elephant = test_app.product("Soapstone Elephant").await; // stock 12

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": elephant.id, "quantity": 13}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["available"], 12);

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": elephant.id, "quantity": 0}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": uuid::Uuid::new_v4(), "quantity": 1}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .insert_header(("content-type", "application/json"))
    .set_payload("{\"productId\": ")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].is_string());
}

#[actix_web::test]
#[serial]
async fn requests_with_a_stored_session_refresh_its_cookie() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);
  let mask = test_app.product("Hand-carved Wooden Mask").await;

  // No session, nothing stored: a plain read sets no cookie.
  let req = test::TestRequest::get().uri("/api/cart").to_request();
  let resp = test::call_service(&app, req).await;
  assert!(session_cookie(&resp).is_none());

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": mask.id}))
    .to_request();
  let cookie = session_cookie(&test::call_service(&app, req).await).unwrap();

  let req = test::TestRequest::get().uri("/api/cart").cookie(cookie.clone()).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let refreshed = session_cookie(&resp).expect("read refreshes the session cookie");
  assert_eq!(refreshed.max_age(), cookie.max_age());
}

/// Loads nothing and refuses every save.
struct UnwritableSessions;

#[async_trait]
impl SessionStore for UnwritableSessions {
  async fn load(&self, _id: &SessionId) -> StoreResult<Option<SessionData>> {
    Ok(None)
  }
  async fn save(&self, _id: &SessionId, _data: &SessionData) -> StoreResult<SessionData> {
    Err(StoreError::backend(anyhow::anyhow!("session table unavailable")))
  }
  async fn destroy(&self, _id: &SessionId) -> StoreResult<()> {
    Ok(())
  }
  async fn prune_expired(&self) -> StoreResult<usize> {
    Ok(0)
  }
}

#[actix_web::test]
#[serial]
async fn add_writes_nothing_when_the_new_session_cannot_be_saved() {
  let test_app = TestApp::with_sessions(AppConfig::for_tests(), Arc::new(UnwritableSessions)).await;
  let app = init_app!(test_app);
  let mask = test_app.product("Hand-carved Wooden Mask").await;

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": mask.id}))
    .to_request();
  let resp = test::call_service(&app, req).await;

  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  assert!(session_cookie(&resp).is_none());
  assert_eq!(test_app.store.cart_row_count(), 0);
}

#[actix_web::test]
#[serial]
async fn another_browser_cannot_touch_my_rows() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);
  let necklace = test_app.product("Maasai Beaded Necklace").await;

  let add = |qty: i64| {
    test::TestRequest::post()
      .uri("/api/cart")
      .set_json(json!({"productId": necklace.id, "quantity": qty}))
  };

  let resp = test::call_service(&app, add(2).to_request()).await;
  let mine = session_cookie(&resp).unwrap();
  let my_line: Value = test::read_body_json(resp).await;
  let my_item_id = my_line["id"].as_str().unwrap().to_string();

  let resp = test::call_service(&app, add(1).to_request()).await;
  let theirs = session_cookie(&resp).unwrap();

  let req = test::TestRequest::put()
    .uri(&format!("/api/cart/{}", my_item_id))
    .cookie(theirs.clone())
    .set_json(json!({"quantity": 9}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::delete()
    .uri(&format!("/api/cart/{}", my_item_id))
    .cookie(theirs.clone())
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::get().uri("/api/cart").cookie(mine.clone()).to_request();
  let cart: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0]["quantity"], 2);
}

#[actix_web::test]
#[serial]
async fn update_remove_and_clear_over_http() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);
  let mask = test_app.product("Hand-carved Wooden Mask").await;
  let wrap = test_app.product("Kikoy Beach Wrap").await;

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": mask.id, "quantity": 1}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  let cookie = session_cookie(&resp).unwrap();
  let line: Value = test::read_body_json(resp).await;
  let item_id = line["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::put()
    .uri(&format!("/api/cart/{}", item_id))
    .cookie(cookie.clone())
    .set_json(json!({"quantity": 3}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let line: Value = test::read_body_json(resp).await;
  assert_eq!(line["quantity"], 3);

  let req = test::TestRequest::put()
    .uri(&format!("/api/cart/{}", item_id))
    .cookie(cookie.clone())
    .set_json(json!({}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["field"], "quantity");

  let req = test::TestRequest::delete()
    .uri(&format!("/api/cart/{}", item_id))
    .cookie(cookie.clone())
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .cookie(cookie.clone())
    .set_json(json!({"productId": wrap.id, "quantity": 1}))
    .to_request();
  test::call_service(&app, req).await;

  for expected_removed in [1, 0] {
    let req = test::TestRequest::delete().uri("/api/cart").cookie(cookie.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["removed"], expected_removed);
  }

  let req = test::TestRequest::put()
    .uri("/api/cart/not-a-uuid")
    .cookie(cookie.clone())
    .set_json(json!({"quantity": 1}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn login_required_mode_hides_and_blocks_anonymous_carts() {
  let mut config = AppConfig::for_tests();
  config.cart_require_login = true;
  let test_app = TestApp::with_config(config).await;
  let app = init_app!(test_app);
  let mask = test_app.product("Hand-carved Wooden Mask").await;

  let req = test::TestRequest::get().uri("/api/cart").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let cart: Vec<Value> = test::read_body_json(resp).await;
  assert!(cart.is_empty());

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({"productId": mask.id, "quantity": 1}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::delete().uri("/api/cart").to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn catalogue_endpoints_list_and_filter() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);

  let req = test::TestRequest::get().uri("/api/products").to_request();
  let products: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(products.len(), 4);

  let req = test::TestRequest::get().uri("/api/products?featured=true").to_request();
  let featured: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(featured.len(), 3);

  let req = test::TestRequest::get().uri("/api/products?search=maasai").to_request();
  let found: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(found.len(), 1);
  assert_eq!(found[0]["name"], "Maasai Beaded Necklace");

  let req = test::TestRequest::get().uri("/api/categories").to_request();
  let categories: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(categories.len(), 4);

  let req = test::TestRequest::get()
    .uri(&format!("/api/products/{}", uuid::Uuid::new_v4()))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::get().uri("/api/health").to_request();
  let health: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(health["store"], "memory");
}

#[actix_web::test]
#[serial]
async fn vendor_storefronts_hide_contact_details_and_list_their_products() {
  let test_app = TestApp::new().await;
  let app = init_app!(test_app);

  let req = test::TestRequest::get().uri("/api/vendors").to_request();
  let vendors: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(vendors.len(), 2);
  assert!(vendors.iter().all(|v| v.get("email").is_none() && v.get("passwordHash").is_none()));
  let wanjiku = vendors
    .iter()
    .find(|v| v["businessName"] == "Wanjiku Crafts")
    .expect("seeded vendor listed");
  let vendor_id = wanjiku["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::get().uri(&format!("/api/vendors/{}", vendor_id)).to_request();
  let profile: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(profile["businessName"], "Wanjiku Crafts");

  let req = test::TestRequest::get()
    .uri(&format!("/api/vendors/{}/products", vendor_id))
    .to_request();
  let products: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  let names: Vec<&str> = products.iter().map(|p| p["name"].as_str().unwrap()).collect();
  assert_eq!(names, vec!["Hand-carved Wooden Mask", "Kikoy Beach Wrap"]);

  // A customer account is not a storefront.
  let customer = test_app
    .store
    .find_user_by_email(CUSTOMER_EMAIL)
    .await
    .unwrap()
    .expect("seeded customer");
  for uri in [
    format!("/api/vendors/{}", customer.id),
    format!("/api/vendors/{}/products", customer.id),
  ] {
    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
  }
}
