// kifaru-server/src/web/session.rs

//! Signed session cookie and the per-request session extractor.

use crate::errors::{AppError, Result};
use crate::state::AppState;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, CookieJar, SameSite};
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use futures_util::future::LocalBoxFuture;
use kifaru_core::session::{self, CartSession, SessionId};
use tracing::{debug, warn};

pub const SESSION_COOKIE: &str = "kifaru.sid";

/// The caller's session, loaded from the signed `kifaru.sid` cookie.
///
/// A missing, tampered or expired cookie yields a fresh anonymous session; nothing is stored until
/// a handler changes it and calls `commit`.
pub struct RequestSession(pub CartSession);

impl FromRequest for RequestSession {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let cookie = req.cookie(SESSION_COOKIE);
    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      Ok(RequestSession(load(&state, cookie).await?))
    })
  }
}

async fn load(state: &AppState, cookie: Option<Cookie<'static>>) -> Result<CartSession> {
  let Some(cookie) = cookie else {
    return Ok(CartSession::fresh());
  };

  let mut jar = CookieJar::new();
  jar.add_original(cookie);
  let verified = match jar.signed(&state.cookie_key).get(SESSION_COOKIE) {
    Some(verified) => verified,
    None => {
      warn!("Session cookie failed signature verification; starting a fresh session.");
      return Ok(CartSession::fresh());
    }
  };

  let Some(id) = SessionId::from_cookie_value(verified.value()) else {
    return Ok(CartSession::fresh());
  };
  match state.sessions().load(&id).await? {
    Some(data) => Ok(CartSession::existing(id, data)),
    None => {
      debug!("Session cookie refers to an unknown or expired session.");
      Ok(CartSession::fresh())
    }
  }
}

fn signed_cookie(state: &AppState, value: String, max_age: CookieDuration) -> Cookie<'static> {
  let cookie = Cookie::build(SESSION_COOKIE, value)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(state.config.cookie_secure)
    .max_age(max_age)
    .finish();

  let mut jar = CookieJar::new();
  jar.signed_mut(&state.cookie_key).add(cookie.clone());
  jar.get(SESSION_COOKIE).cloned().unwrap_or(cookie)
}

/// Attaches a freshly signed cookie for `session` to `response`.
pub fn set_session_cookie(state: &AppState, session: &CartSession, response: &mut HttpResponse) -> Result<()> {
  let ttl = CookieDuration::try_from(state.config.session_ttl).unwrap_or(CookieDuration::weeks(1));
  let cookie = signed_cookie(state, session.id().to_string(), ttl);
  response
    .add_cookie(&cookie)
    .map_err(|e| AppError::Internal(format!("Could not set session cookie: {}", e)))
}

/// Saves `session` if a handler changed it or the browser already holds it, which slides the
/// expiry forward. Returns whether the cookie has to be (re)issued.
pub async fn save(state: &AppState, session: &mut CartSession) -> Result<bool> {
  session.touch();
  Ok(session::persist(state.sessions().as_ref(), session).await?)
}

/// `save`, then (re)issues the cookie if anything was stored.
pub async fn commit(state: &AppState, session: &mut CartSession, response: &mut HttpResponse) -> Result<()> {
  if save(state, session).await? {
    set_session_cookie(state, session, response)?;
  }
  Ok(())
}

/// Tells the browser to drop the session cookie.
pub fn clear_session_cookie(state: &AppState, response: &mut HttpResponse) -> Result<()> {
  let cookie = signed_cookie(state, String::new(), CookieDuration::ZERO);
  response
    .add_cookie(&cookie)
    .map_err(|e| AppError::Internal(format!("Could not clear session cookie: {}", e)))
}
