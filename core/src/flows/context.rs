// kifaru-core/src/flows/context.rs

use crate::auth::{LoginInput, RegistrationInput};
use crate::cart::{CartService, MergeReport};
use crate::models::{CartItem, User};
use crate::ownership::OwnerKey;
use crate::session::{CartSession, SessionStore};
use crate::store::Store;
use std::sync::Arc;

/// Everything an identity flow talks to. Cheap to clone.
#[derive(Clone)]
pub struct IdentityServices {
  pub store: Arc<dyn Store>,
  pub sessions: Arc<dyn SessionStore>,
  pub cart: CartService,
}

impl IdentityServices {
  pub fn new(store: Arc<dyn Store>, sessions: Arc<dyn SessionStore>) -> Self {
    Self {
      cart: CartService::new(store.clone()),
      store,
      sessions,
    }
  }
}

#[derive(Debug, Clone)]
pub enum IdentityRequest {
  Login(LoginInput),
  Register(RegistrationInput),
}

/// Pipeline data for login and registration.
pub struct AuthCtxData {
  pub services: IdentityServices,
  pub session: CartSession,
  pub request: IdentityRequest,
  /// The browser's anonymous cart key, captured before the session is authenticated.
  pub anonymous_owner: Option<OwnerKey>,
  pub user: Option<User>,
  /// Rows read from the anonymous cart. `None` means the merge is skipped.
  pub snapshot: Option<Vec<CartItem>>,
  pub merge: MergeReport,
}

impl AuthCtxData {
  pub fn new(services: IdentityServices, session: CartSession, request: IdentityRequest) -> Self {
    Self {
      anonymous_owner: session.anonymous_owner(),
      services,
      session,
      request,
      user: None,
      snapshot: None,
      merge: MergeReport::default(),
    }
  }
}

/// What a completed login or registration returns.
#[derive(Debug, Clone)]
pub struct IdentityOutcome {
  /// Authenticated and already persisted.
  pub session: CartSession,
  pub user: User,
  pub merge: MergeReport,
}
