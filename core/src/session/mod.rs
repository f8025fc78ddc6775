// kifaru-core/src/session/mod.rs

//! Server-side sessions and the cart identifier resolver.
//!
//! A `CartSession` is loaded once per request (by the HTTP layer, from a verified cookie) and passed
//! explicitly to whatever needs it. Mutations mark it dirty; the caller persists it through a
//! `SessionStore` before responding.

pub mod memory;

use crate::models::{Role, UserId};
use crate::ownership::{AnonToken, OwnerKey};
use crate::store::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use memory::MemorySessionStore;

/// Opaque identifier of a server-side session. This is what the cookie carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
  pub fn generate() -> Self {
    SessionId(Uuid::new_v4().simple().to_string())
  }

  /// Wraps a value read back from a (signature-verified) cookie.
  pub fn from_cookie_value(raw: &str) -> Option<Self> {
    let raw = raw.trim();
    let well_formed = !raw.is_empty() && raw.len() <= 64 && raw.bytes().all(|b| b.is_ascii_alphanumeric());
    well_formed.then(|| SessionId(raw.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// What is persisted per session. Never holds credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionData {
  pub user_id: Option<UserId>,
  pub role: Option<Role>,
  /// Anonymous cart token, created lazily by the first cart operation.
  pub cart_token: Option<AnonToken>,
  /// Set by the store on every save.
  pub expires_at: Option<DateTime<Utc>>,
}

/// The per-request session context.
#[derive(Debug, Clone)]
pub struct CartSession {
  id: SessionId,
  data: SessionData,
  dirty: bool,
  fresh: bool,
}

impl CartSession {
  /// A session that has never been persisted.
  pub fn fresh() -> Self {
    Self {
      id: SessionId::generate(),
      data: SessionData::default(),
      dirty: false,
      fresh: true,
    }
  }

  /// A session loaded from a `SessionStore`.
  pub fn existing(id: SessionId, data: SessionData) -> Self {
    Self {
      id,
      data,
      dirty: false,
      fresh: false,
    }
  }

  pub fn id(&self) -> &SessionId {
    &self.id
  }

  pub fn data(&self) -> &SessionData {
    &self.data
  }

  pub fn user_id(&self) -> Option<UserId> {
    self.data.user_id
  }

  pub fn role(&self) -> Option<Role> {
    self.data.role
  }

  pub fn is_authenticated(&self) -> bool {
    self.data.user_id.is_some()
  }

  /// Whether the session has unsaved changes.
  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Whether the session has never been saved (no cookie has been issued for it yet).
  pub fn is_fresh(&self) -> bool {
    self.fresh
  }

  /// The ownership key for cart operations.
  ///
  /// Authenticated sessions resolve to the user's key. Otherwise the anonymous token is returned,
  /// generating and recording one first if the session has none.
  pub fn resolve_owner(&mut self) -> OwnerKey {
    if let Some(user_id) = self.data.user_id {
      return OwnerKey::for_user(user_id);
    }
    let token = match &self.data.cart_token {
      Some(token) => token.clone(),
      None => {
        let token = AnonToken::generate();
        self.data.cart_token = Some(token.clone());
        self.dirty = true;
        token
      }
    };
    OwnerKey::Anonymous(token)
  }

  /// The ownership key if one already exists, without creating an anonymous token.
  pub fn current_owner(&self) -> Option<OwnerKey> {
    match self.data.user_id {
      Some(user_id) => Some(OwnerKey::for_user(user_id)),
      None => self.anonymous_owner(),
    }
  }

  /// The anonymous cart key of this browser, if it ever created one.
  pub fn anonymous_owner(&self) -> Option<OwnerKey> {
    self.data.cart_token.clone().map(OwnerKey::Anonymous)
  }

  /// Records a successful login. The anonymous token is kept; the merge flow decides what to do
  /// with the rows under it.
  pub fn authenticate(&mut self, user_id: UserId, role: Role) {
    self.data.user_id = Some(user_id);
    self.data.role = Some(role);
    self.dirty = true;
  }

  /// Marks a previously saved session for re-saving so its expiry slides forward. A session that
  /// was never saved stays unsaved.
  pub fn touch(&mut self) {
    if !self.fresh {
      self.dirty = true;
    }
  }

  /// Moves the session data to a newly generated id, so a cookie issued before a privilege change
  /// cannot follow it. Returns the previous id if it was ever persisted; the caller destroys it.
  pub fn rotate_id(&mut self) -> Option<SessionId> {
    let previous = std::mem::replace(&mut self.id, SessionId::generate());
    let was_stored = !self.fresh;
    self.fresh = true;
    self.dirty = true;
    was_stored.then_some(previous)
  }

  /// Called by the persistence layer after a successful save.
  pub fn mark_saved(&mut self, data: SessionData) {
    self.data = data;
    self.dirty = false;
    self.fresh = false;
  }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
  /// Returns `None` for unknown or expired sessions.
  async fn load(&self, id: &SessionId) -> StoreResult<Option<SessionData>>;

  /// Persists `data` and returns it as stored (with a refreshed expiry).
  async fn save(&self, id: &SessionId, data: &SessionData) -> StoreResult<SessionData>;

  async fn destroy(&self, id: &SessionId) -> StoreResult<()>;

  /// Drops expired sessions, returning how many were removed.
  async fn prune_expired(&self) -> StoreResult<usize>;
}

/// Saves `session` if it has unsaved changes. Returns whether a save happened.
pub async fn persist(store: &dyn SessionStore, session: &mut CartSession) -> StoreResult<bool> {
  if !session.is_dirty() {
    return Ok(false);
  }
  let stored = store.save(session.id(), session.data()).await?;
  session.mark_saved(stored);
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn anonymous_owner_is_created_once_and_reused() {
    let mut session = CartSession::fresh();
    assert!(session.current_owner().is_none());

    let first = session.resolve_owner();
    assert!(first.is_anonymous());
    assert!(session.is_dirty());

    let second = session.resolve_owner();
    assert_eq!(first, second);
  }

  #[test]
  fn authenticated_session_resolves_to_user_key() {
    let mut session = CartSession::fresh();
    let anon = session.resolve_owner();
    let user_id = Uuid::new_v4();
    session.authenticate(user_id, Role::Customer);

    assert_eq!(session.resolve_owner(), OwnerKey::for_user(user_id));
    assert_eq!(session.anonymous_owner(), Some(anon));
  }

  #[test]
  fn touch_only_marks_saved_sessions() {
    let mut fresh = CartSession::fresh();
    fresh.touch();
    assert!(!fresh.is_dirty());

    let mut existing = CartSession::existing(SessionId::generate(), SessionData::default());
    existing.touch();
    assert!(existing.is_dirty());
  }

  #[test]
  fn rotating_keeps_the_data_under_a_new_id() {
    let mut session = CartSession::existing(SessionId::generate(), SessionData::default());
    let token = session.resolve_owner();
    let before = session.id().clone();

    assert_eq!(session.rotate_id(), Some(before.clone()));
    assert_ne!(session.id(), &before);
    assert!(session.is_dirty());
    assert_eq!(session.anonymous_owner(), Some(token));

    // Nothing to destroy for a session that was never saved.
    assert_eq!(CartSession::fresh().rotate_id(), None);
  }

  #[test]
  fn session_ids_from_cookies_are_sanitised() {
    assert!(SessionId::from_cookie_value("abc123").is_some());
    assert!(SessionId::from_cookie_value("").is_none());
    assert!(SessionId::from_cookie_value("../etc/passwd").is_none());
  }
}
