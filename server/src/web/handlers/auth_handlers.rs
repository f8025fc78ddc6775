// kifaru-server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use kifaru_core::auth::{LoginInput, RegistrationInput};
use kifaru_core::models::{PublicUser, Role};
use kifaru_core::store::UserStore;
use kifaru_core::{run_identity, CartError, IdentityRequest};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::session::{clear_session_cookie, commit, set_session_cookie, RequestSession};

// --- Request DTOs ---
#[derive(Deserialize)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestPayload {
  pub email: String,
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Option<Role>,
  pub business_name: Option<String>,
  pub location: Option<String>,
  pub phone: Option<String>,
}

// --- Handler Implementations ---

#[instrument(name = "handler::login", skip_all)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  session: RequestSession,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let request = IdentityRequest::Login(LoginInput {
    email: payload.email,
    password: payload.password,
  });

  let outcome = run_identity(&app_state.login_pipeline, &app_state.services, session.0, request).await?;
  info!(
    user_id = %outcome.user.id,
    merged = outcome.merge.migrated.len(),
    skipped = outcome.merge.skipped.len(),
    "Login successful."
  );

  let mut response = HttpResponse::Ok().json(json!({
    "message": "Login successful",
    "user": PublicUser::from(&outcome.user),
    "cartMerge": outcome.merge,
  }));
  set_session_cookie(&app_state, &outcome.session, &mut response)?;
  Ok(response)
}

#[instrument(name = "handler::register", skip_all)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  session: RequestSession,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let request = IdentityRequest::Register(RegistrationInput {
    email: payload.email,
    password: payload.password,
    first_name: payload.first_name,
    last_name: payload.last_name,
    role: payload.role,
    business_name: payload.business_name,
    location: payload.location,
    phone: payload.phone,
  });

  let outcome = run_identity(&app_state.register_pipeline, &app_state.services, session.0, request).await?;
  info!(user_id = %outcome.user.id, role = %outcome.user.role, "Registration successful.");

  let mut response = HttpResponse::Created().json(json!({
    "message": "User created successfully",
    "user": PublicUser::from(&outcome.user),
    "cartMerge": outcome.merge,
  }));
  set_session_cookie(&app_state, &outcome.session, &mut response)?;
  Ok(response)
}

#[instrument(name = "handler::logout", skip_all)]
pub async fn logout_handler(app_state: web::Data<AppState>, session: RequestSession) -> Result<HttpResponse, AppError> {
  let session = session.0;
  if !session.is_fresh() {
    app_state.sessions().destroy(session.id()).await?;
    info!(user_id = ?session.user_id(), "Session destroyed.");
  }

  let mut response = HttpResponse::Ok().json(json!({"message": "Logged out successfully"}));
  clear_session_cookie(&app_state, &mut response)?;
  Ok(response)
}

#[instrument(name = "handler::me", skip_all)]
pub async fn me_handler(app_state: web::Data<AppState>, session: RequestSession) -> Result<HttpResponse, AppError> {
  let mut session = session.0;
  let user_id = session.user_id().ok_or(CartError::AuthenticationRequired)?;
  match app_state.store().get_user(user_id).await? {
    Some(user) => {
      let mut response = HttpResponse::Ok().json(json!({"user": PublicUser::from(&user)}));
      commit(&app_state, &mut session, &mut response).await?;
      Ok(response)
    }
    None => {
      warn!(user_id = %user_id, "Session refers to a user that no longer exists.");
      Err(CartError::AuthenticationRequired.into())
    }
  }
}
