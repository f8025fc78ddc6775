// src/lib.rs

//! Kifaru core: cart ownership, cart storage and the login-time cart merge.
//!
//! A cart row belongs to an `OwnerKey`, which is either an unguessable anonymous token held in the
//! visitor's session or the key derived from an authenticated user's id. The pieces:
//!  - `ownership`: the two key shapes and their canonical string form.
//!  - `cart`: owner-scoped add/update/remove/clear with stock checks, and the merge routine.
//!  - `session`: per-request session context that resolves the current owner key.
//!  - `flows`: login and registration pipelines that re-home the anonymous cart.
//!  - `store`: the persistence traits plus an in-memory backend.

pub mod auth;
pub mod cart;
pub mod error;
pub mod flows;
pub mod models;
pub mod ownership;
pub mod pipeline;
pub mod session;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::cart::{AddedLine, CartService, MergeReport, SkippedItem};
pub use crate::error::{CartError, CartResult, PipelineError, StoreError};
pub use crate::flows::{
  build_login_pipeline, build_registration_pipeline, run_identity, IdentityOutcome, IdentityPipeline, IdentityRequest,
  IdentityServices,
};
pub use crate::ownership::{AnonToken, OwnerKey};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult, StepDef};
pub use crate::session::{CartSession, MemorySessionStore, SessionData, SessionId, SessionStore};
pub use crate::store::{MemoryStore, Store, StoreResult};
