// kifaru-core/src/pipeline/control.rs

/// Returned by a handler: keep going, or end the run here without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran, was skipped, or failed best-effort.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
