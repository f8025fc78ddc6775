// kifaru-core/src/pipeline/execution.rs

use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::definition::Pipeline;
use crate::error::PipelineError;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// A step with no handlers fails the run with `PipelineError::HandlerMissing`. A handler error
  /// fails the run unless its step is best-effort, in which case the remaining handlers of that
  /// step are skipped and the run moves on to the next step.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        best_effort = step_def.best_effort
      );

      if let Some(skip_cond) = &step_def.skip_if {
        let skip = {
          let guard = ctx_data.read();
          skip_cond(&guard)
        };
        if skip {
          step_span.in_scope(|| event!(Level::DEBUG, "Step skipped due to 'skip_if' condition."));
          continue;
        }
      }

      let handlers = match self.handlers.get(&step_def.name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ => {
          step_span.in_scope(|| event!(Level::ERROR, "Step has no handlers."));
          return Err(Err::from(PipelineError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            step_span.in_scope(|| event!(Level::INFO, "Pipeline stopped by a handler."));
            return Ok(PipelineResult::Stopped);
          }
          Err(e) if step_def.best_effort => {
            step_span.in_scope(|| event!(Level::WARN, error = %e, "Best-effort step failed; continuing."));
            break;
          }
          Err(e) => {
            step_span.in_scope(|| event!(Level::ERROR, error = %e, "Step failed."));
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pipeline::StepDef;

  #[derive(Debug, thiserror::Error)]
  enum TestError {
    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("handler: {0}")]
    Handler(&'static str),
  }

  #[derive(Default)]
  struct Trace {
    ran: Vec<&'static str>,
  }

  fn record(name: &'static str) -> impl Fn(ContextData<Trace>) -> std::future::Ready<Result<PipelineControl, TestError>> {
    move |ctx: ContextData<Trace>| {
      ctx.write().ran.push(name);
      std::future::ready(Ok(PipelineControl::Continue))
    }
  }

  #[tokio::test]
  async fn best_effort_failure_does_not_abort() {
    let mut p = Pipeline::<Trace, TestError>::new(
      "test",
      vec![StepDef::required("a"), StepDef::best_effort("b"), StepDef::required("c")],
    );
    p.on("a", record("a"));
    p.on("b", |_ctx: ContextData<Trace>| async { Err::<PipelineControl, _>(TestError::Handler("boom")) });
    p.on("c", record("c"));

    let ctx = ContextData::new(Trace::default());
    assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
    assert_eq!(ctx.read().ran, vec!["a", "c"]);
  }

  #[tokio::test]
  async fn missing_handler_is_reported() {
    let p = Pipeline::<Trace, TestError>::new("test", vec![StepDef::required("lonely")]);
    let err = p.run(ContextData::new(Trace::default())).await.unwrap_err();
    assert!(matches!(err, TestError::Pipeline(PipelineError::HandlerMissing { .. })));
  }

  #[test]
  #[should_panic(expected = "declared twice")]
  fn duplicate_steps_panic() {
    let _ = Pipeline::<Trace, TestError>::new("test", vec![StepDef::required("x"), StepDef::required("x")]);
  }
}
