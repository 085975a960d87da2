//! Predicate expression engine: hash-consed expression DAG, build-time
//! optimizer and phase-driven incremental evaluator.
//!
//! A configuration is built once into a sealed [`Dag`] and shared by every
//! transaction. Each transaction owns an [`EvalContext`] that is advanced
//! phase by phase as var data becomes available.

mod builder;
mod catalog;
mod dag;
mod environment;
mod error;
mod eval;
mod functions;
mod node;
mod optimize;
mod registry;
mod serialize;
mod stdlib;
mod step;
mod template;
mod validate;

pub use builder::{Builder, build};
pub use catalog::{
    Catalog, ExternalError, Operator, OperatorInstance, OperatorMatch, Transformation,
};
pub use dag::{Dag, RootId};
pub use environment::Environment;
pub use error::{BuildError, EvalError};
pub use eval::{EvalContext, MemoryVarSource, NodeView, PhaseReport, VarSource};
pub use functions::{Arity, Function, FunctionGroup, Signature, builtin_tags};
pub use node::{CallNode, LiteralNode, Node, NodeId, NodeKind, VarNode};
