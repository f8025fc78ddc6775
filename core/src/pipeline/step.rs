// kifaru-core/src/pipeline/step.rs

use std::fmt;
use std::sync::Arc;

/// Evaluated under a read lock just before the step runs; `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(&TData) -> bool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct StepDef<TData: 'static + Send + Sync> {
  pub name: String,
  /// A failing best-effort step is logged and the run carries on with the next step.
  pub best_effort: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: 'static + Send + Sync> StepDef<TData> {
  /// A step whose failure fails the whole run.
  pub fn required(name: &str) -> Self {
    Self {
      name: name.to_string(),
      best_effort: false,
      skip_if: None,
    }
  }

  pub fn best_effort(name: &str) -> Self {
    Self {
      best_effort: true,
      ..Self::required(name)
    }
  }

  pub fn skip_if(mut self, condition: impl Fn(&TData) -> bool + Send + Sync + 'static) -> Self {
    self.skip_if = Some(Arc::new(condition));
    self
  }
}

impl<TData: 'static + Send + Sync> fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("best_effort", &self.best_effort)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
