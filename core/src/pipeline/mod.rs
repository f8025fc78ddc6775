// kifaru-core/src/pipeline/mod.rs

//! A small named-step pipeline for multi-step request flows.
//!
//! Steps run strictly in declaration order against one shared `ContextData<TData>`. Each step can be
//! skipped by a condition on the context, and a step marked best-effort has its failure logged and
//! swallowed instead of aborting the run.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline};
pub use step::{SkipCondition, StepDef};
