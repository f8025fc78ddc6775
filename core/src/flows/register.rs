// kifaru-core/src/flows/register.rs

use super::context::AuthCtxData;
use super::steps::{self, CREATE_ACCOUNT, VALIDATE_REGISTRATION_INPUT};
use super::IdentityPipeline;
use crate::pipeline::StepDef;
use tracing::info;

/// Same tail as login: a new account also picks up whatever the visitor put in the cart.
pub fn build_registration_pipeline() -> IdentityPipeline {
  let mut step_defs: Vec<StepDef<AuthCtxData>> = vec![
    StepDef::required(VALIDATE_REGISTRATION_INPUT),
    StepDef::required(CREATE_ACCOUNT),
  ];
  step_defs.extend(steps::session_and_merge_steps());

  let mut pipeline = IdentityPipeline::new("register", step_defs);
  pipeline.on(VALIDATE_REGISTRATION_INPUT, steps::validate_registration_input);
  pipeline.on(CREATE_ACCOUNT, steps::create_account);
  steps::register_session_and_merge_handlers(&mut pipeline);

  info!(steps = ?pipeline.step_names(), "Registration pipeline built.");
  pipeline
}
