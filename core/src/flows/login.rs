// kifaru-core/src/flows/login.rs

use super::context::AuthCtxData;
use super::steps::{self, VALIDATE_LOGIN_INPUT, VERIFY_CREDENTIALS};
use super::IdentityPipeline;
use crate::pipeline::StepDef;
use tracing::info;

/// validate -> verify credentials -> save session -> snapshot -> re-home -> clear.
pub fn build_login_pipeline() -> IdentityPipeline {
  let mut step_defs: Vec<StepDef<AuthCtxData>> = vec![
    StepDef::required(VALIDATE_LOGIN_INPUT),
    StepDef::required(VERIFY_CREDENTIALS),
  ];
  step_defs.extend(steps::session_and_merge_steps());

  let mut pipeline = IdentityPipeline::new("login", step_defs);
  pipeline.on(VALIDATE_LOGIN_INPUT, steps::validate_login_input);
  pipeline.on(VERIFY_CREDENTIALS, steps::verify_credentials);
  steps::register_session_and_merge_handlers(&mut pipeline);

  info!(steps = ?pipeline.step_names(), "Login pipeline built.");
  pipeline
}
