// kifaru-core/src/flows/steps.rs

//! Step handlers shared by the login and registration pipelines.

use super::context::{AuthCtxData, IdentityRequest};
use crate::auth::{hash_password, verify_password};
use crate::cart::rehome_items;
use crate::error::{CartError, CartResult, PipelineError, StoreError};
use crate::models::NewUser;
use crate::pipeline::{ContextData, PipelineControl, StepDef};
use crate::session::{self, SessionStore};
use crate::store::{CartStore, UserStore};
use tracing::{debug, info, instrument, warn};

pub const VALIDATE_LOGIN_INPUT: &str = "validate_login_input";
pub const VERIFY_CREDENTIALS: &str = "verify_credentials";
pub const VALIDATE_REGISTRATION_INPUT: &str = "validate_registration_input";
pub const CREATE_ACCOUNT: &str = "create_account";
pub const ESTABLISH_SESSION: &str = "establish_session";
pub const SNAPSHOT_ANONYMOUS_CART: &str = "snapshot_anonymous_cart";
pub const REHOME_CART_ITEMS: &str = "rehome_cart_items";
pub const CLEAR_ANONYMOUS_CART: &str = "clear_anonymous_cart";

fn invalid_state(step_name: &str, message: &str) -> CartError {
  PipelineError::InvalidState {
    step_name: step_name.to_string(),
    message: message.to_string(),
  }
  .into()
}

/// The steps that run once a user is known. Appended to both pipelines.
pub(crate) fn session_and_merge_steps() -> Vec<StepDef<AuthCtxData>> {
  vec![
    StepDef::required(ESTABLISH_SESSION),
    StepDef::best_effort(SNAPSHOT_ANONYMOUS_CART).skip_if(|d: &AuthCtxData| d.anonymous_owner.is_none()),
    StepDef::required(REHOME_CART_ITEMS).skip_if(|d: &AuthCtxData| d.snapshot.is_none()),
    StepDef::best_effort(CLEAR_ANONYMOUS_CART).skip_if(|d: &AuthCtxData| d.snapshot.is_none()),
  ]
}

pub(crate) fn register_session_and_merge_handlers(pipeline: &mut super::IdentityPipeline) {
  pipeline.on(ESTABLISH_SESSION, establish_session);
  pipeline.on(SNAPSHOT_ANONYMOUS_CART, snapshot_anonymous_cart);
  pipeline.on(REHOME_CART_ITEMS, rehome_cart_items);
  pipeline.on(CLEAR_ANONYMOUS_CART, clear_anonymous_cart);
}

pub async fn validate_login_input(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let mut guard = ctx_data.write();
  let input = match &guard.request {
    IdentityRequest::Login(input) => input.clone(),
    IdentityRequest::Register(_) => return Err(invalid_state(VALIDATE_LOGIN_INPUT, "expected a login request")),
  };
  let input = input.validate()?;
  debug!(email = %input.email, "Login input validated.");
  guard.request = IdentityRequest::Login(input);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "flows::verify_credentials", skip_all, err(Display))]
pub async fn verify_credentials(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let (store, input) = {
    let guard = ctx_data.read();
    match &guard.request {
      IdentityRequest::Login(input) => (guard.services.store.clone(), input.clone()),
      IdentityRequest::Register(_) => return Err(invalid_state(VERIFY_CREDENTIALS, "expected a login request")),
    }
  };

  let user = match store.find_user_by_email(&input.email).await? {
    Some(user) => user,
    None => {
      warn!("Login attempt for unknown email.");
      return Err(CartError::InvalidCredentials);
    }
  };

  if !verify_password(&user.password_hash, &input.password)? {
    warn!(user_id = %user.id, "Password mismatch on login.");
    return Err(CartError::InvalidCredentials);
  }

  info!(user_id = %user.id, "Credentials verified.");
  ctx_data.write().user = Some(user);
  Ok(PipelineControl::Continue)
}

pub async fn validate_registration_input(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let mut guard = ctx_data.write();
  let input = match &guard.request {
    IdentityRequest::Register(input) => input.clone(),
    IdentityRequest::Login(_) => {
      return Err(invalid_state(VALIDATE_REGISTRATION_INPUT, "expected a registration request"))
    }
  };
  guard.request = IdentityRequest::Register(input.validate()?);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "flows::create_account", skip_all, err(Display))]
pub async fn create_account(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let (store, input) = {
    let guard = ctx_data.read();
    match &guard.request {
      IdentityRequest::Register(input) => (guard.services.store.clone(), input.clone()),
      IdentityRequest::Login(_) => return Err(invalid_state(CREATE_ACCOUNT, "expected a registration request")),
    }
  };

  let password_hash = hash_password(&input.password)?;
  let new_user = NewUser {
    email: input.email,
    password_hash,
    first_name: input.first_name,
    last_name: input.last_name,
    role: input.role.unwrap_or_default(),
    business_name: input.business_name,
    bio: None,
    location: input.location,
    phone: input.phone,
    is_verified: false,
  };

  let user = match store.insert_user(new_user).await {
    Ok(user) => user,
    Err(StoreError::Conflict(_)) => {
      warn!("Registration for an email that already has an account.");
      return Err(CartError::Conflict("An account with this email already exists.".to_string()));
    }
    Err(other) => return Err(other.into()),
  };

  info!(user_id = %user.id, role = %user.role, "Account created.");
  ctx_data.write().user = Some(user);
  Ok(PipelineControl::Continue)
}

/// Writes the user into the session and saves it before any cart row is touched.
#[instrument(name = "flows::establish_session", skip_all, err(Display))]
pub async fn establish_session(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let (sessions, mut session) = {
    let guard = ctx_data.read();
    let user = guard
      .user
      .as_ref()
      .ok_or_else(|| invalid_state(ESTABLISH_SESSION, "no user to establish a session for"))?;
    let mut session = guard.session.clone();
    session.authenticate(user.id, user.role);
    (guard.services.sessions.clone(), session)
  };

  // The authenticated session never reuses the id the browser arrived with.
  let previous = session.rotate_id();
  session::persist(sessions.as_ref(), &mut session).await?;
  if let Some(previous) = previous {
    // The old id only ever held anonymous data; a leftover copy expires on its own.
    if let Err(err) = sessions.destroy(&previous).await {
      warn!(error = %err, "Could not destroy the pre-login session.");
    }
  }
  info!(session_id = %session.id(), "Authenticated session saved.");
  ctx_data.write().session = session;
  Ok(PipelineControl::Continue)
}

/// Reads the anonymous cart. A failure here skips the merge but not the login.
#[instrument(name = "flows::snapshot_anonymous_cart", skip_all, err(Display))]
pub async fn snapshot_anonymous_cart(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let (store, anonymous_owner) = {
    let guard = ctx_data.read();
    let owner = guard
      .anonymous_owner
      .clone()
      .ok_or_else(|| invalid_state(SNAPSHOT_ANONYMOUS_CART, "no anonymous owner"))?;
    (guard.services.store.clone(), owner)
  };

  let rows = store.list_items(&anonymous_owner).await?;
  debug!(owner = %anonymous_owner, rows = rows.len(), "Anonymous cart snapshot taken.");
  ctx_data.write().snapshot = Some(rows);
  Ok(PipelineControl::Continue)
}

/// Re-adds every snapshot row under the user's key. Per-row failures land in the merge report.
pub async fn rehome_cart_items(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let (cart, snapshot, target) = {
    let guard = ctx_data.read();
    let user = guard
      .user
      .as_ref()
      .ok_or_else(|| invalid_state(REHOME_CART_ITEMS, "no user to re-home items to"))?;
    (
      guard.services.cart.clone(),
      guard.snapshot.clone().unwrap_or_default(),
      crate::ownership::OwnerKey::for_user(user.id),
    )
  };

  if snapshot.is_empty() {
    return Ok(PipelineControl::Continue);
  }
  let report = rehome_items(&cart, &snapshot, &target).await;
  let mut guard = ctx_data.write();
  guard.merge.migrated = report.migrated;
  guard.merge.skipped = report.skipped;
  Ok(PipelineControl::Continue)
}

/// Deletes every anonymous row, including those that failed to re-home.
#[instrument(name = "flows::clear_anonymous_cart", skip_all, err(Display))]
pub async fn clear_anonymous_cart(ctx_data: ContextData<AuthCtxData>) -> CartResult<PipelineControl> {
  let (cart, anonymous_owner) = {
    let guard = ctx_data.read();
    let owner = guard
      .anonymous_owner
      .clone()
      .ok_or_else(|| invalid_state(CLEAR_ANONYMOUS_CART, "no anonymous owner"))?;
    (guard.services.cart.clone(), owner)
  };

  let cleared = cart.clear(&anonymous_owner).await?;
  ctx_data.write().merge.cleared = cleared;
  Ok(PipelineControl::Continue)
}
