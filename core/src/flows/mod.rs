// kifaru-core/src/flows/mod.rs

//! Login and registration, including the anonymous-cart merge that follows them.
//!
//! Both flows are `Pipeline<AuthCtxData, CartError>`s. They share their tail: persist the
//! authenticated session, snapshot the anonymous cart, re-home every row under the user's key, then
//! clear the anonymous cart. Only the steps before the session save can fail the request.

pub mod context;
pub mod login;
pub mod register;
pub mod steps;

use crate::error::{CartError, CartResult, PipelineError};
use crate::pipeline::{ContextData, Pipeline, PipelineResult};
use crate::session::CartSession;
use tracing::{info, instrument};

pub use context::{AuthCtxData, IdentityOutcome, IdentityRequest, IdentityServices};
pub use login::build_login_pipeline;
pub use register::build_registration_pipeline;

pub type IdentityPipeline = Pipeline<AuthCtxData, CartError>;

/// Runs `pipeline` for one request and hands back the updated session, the user and what
/// happened to the anonymous cart.
#[instrument(name = "flows::run_identity", skip_all, fields(pipeline = pipeline.name()), err(Display))]
pub async fn run_identity(
  pipeline: &IdentityPipeline,
  services: &IdentityServices,
  session: CartSession,
  request: IdentityRequest,
) -> CartResult<IdentityOutcome> {
  let ctx_data = ContextData::new(AuthCtxData::new(services.clone(), session, request));
  let result = pipeline.run(ctx_data.clone()).await?;

  let data = ctx_data.try_unwrap().map_err(|_| PipelineError::InvalidState {
    step_name: "<finish>".to_string(),
    message: "context still shared after the run".to_string(),
  })?;

  let user = match (result, data.user) {
    (PipelineResult::Completed, Some(user)) => user,
    (_, _) => {
      return Err(
        PipelineError::InvalidState {
          step_name: "<finish>".to_string(),
          message: "run finished without an authenticated user".to_string(),
        }
        .into(),
      )
    }
  };

  info!(
    user_id = %user.id,
    migrated = data.merge.migrated.len(),
    skipped = data.merge.skipped.len(),
    cleared = data.merge.cleared,
    "Identity flow completed."
  );
  Ok(IdentityOutcome {
    session: data.session,
    user,
    merge: data.merge,
  })
}
