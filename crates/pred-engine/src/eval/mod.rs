//! Per-transaction evaluation: phase-driven var refresh and pull-based
//! recomputation of stale nodes.

mod context;
mod source;

pub use context::{EvalContext, NodeView, PhaseReport};
pub use source::{MemoryVarSource, VarSource};
