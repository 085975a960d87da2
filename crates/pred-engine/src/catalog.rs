//! Registry of host-provided operators and transformations.
//!
//! The engine only knows the calling contract. Entries are looked up while
//! building a DAG and invoked during evaluation; they must be deterministic
//! for the lifetime of a transaction.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use pred_types::{Value, ValueList};
use thiserror::Error;

use crate::stdlib;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExternalError {
    #[error("unsupported input kind {0}")]
    UnsupportedKind(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Failed(String),
}

/// Result of running an operator instance against one input value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperatorMatch {
    pub matched: bool,
    /// Replaces the input payload in the output when present.
    pub capture: Option<ValueList>,
}

impl OperatorMatch {
    pub fn hit() -> Self {
        Self {
            matched: true,
            capture: None,
        }
    }

    pub fn miss() -> Self {
        Self::default()
    }

    pub fn with_capture(capture: ValueList) -> Self {
        Self {
            matched: true,
            capture: Some(capture),
        }
    }
}

/// Named predicate family, e.g. `rx`. Instantiated once per call node with
/// its static argument.
pub trait Operator: Send + Sync {
    fn instantiate(&self, argument: &Value) -> Result<Arc<dyn OperatorInstance>, ExternalError>;

    /// Pure operators may be folded at build time when their input is static.
    fn is_pure(&self) -> bool {
        true
    }
}

pub trait OperatorInstance: Send + Sync {
    fn execute(&self, input: &Value) -> Result<OperatorMatch, ExternalError>;
}

pub trait Transformation: Send + Sync {
    fn transform(&self, input: &Value) -> Result<Value, ExternalError>;

    fn is_pure(&self) -> bool {
        true
    }
}

type OperatorFn = dyn Fn(&Value, &Value) -> Result<OperatorMatch, ExternalError> + Send + Sync;
type TransformFn = dyn Fn(&Value) -> Result<Value, ExternalError> + Send + Sync;

struct FnOperator {
    func: Arc<OperatorFn>,
    pure: bool,
}

struct FnOperatorInstance {
    func: Arc<OperatorFn>,
    argument: Value,
}

impl Operator for FnOperator {
    fn instantiate(&self, argument: &Value) -> Result<Arc<dyn OperatorInstance>, ExternalError> {
        Ok(Arc::new(FnOperatorInstance {
            func: self.func.clone(),
            argument: argument.clone(),
        }))
    }

    fn is_pure(&self) -> bool {
        self.pure
    }
}

impl OperatorInstance for FnOperatorInstance {
    fn execute(&self, input: &Value) -> Result<OperatorMatch, ExternalError> {
        (self.func)(&self.argument, input)
    }
}

struct FnTransformation {
    func: Box<TransformFn>,
    pure: bool,
}

impl Transformation for FnTransformation {
    fn transform(&self, input: &Value) -> Result<Value, ExternalError> {
        (self.func)(input)
    }

    fn is_pure(&self) -> bool {
        self.pure
    }
}

#[derive(Clone, Default)]
pub struct Catalog {
    operators: IndexMap<String, Arc<dyn Operator>>,
    transformations: IndexMap<String, Arc<dyn Transformation>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue preloaded with `rx`, `streq`, `contains`, `length`,
    /// `lowercase`, `uppercase` and `trim`.
    pub fn with_standard() -> Self {
        let mut catalog = Self::new();
        stdlib::register(&mut catalog);
        catalog
    }

    /// Registers an operator, replacing any previous entry with that name.
    pub fn register_operator(&mut self, name: impl Into<String>, operator: Arc<dyn Operator>) {
        self.operators.insert(name.into(), operator);
    }

    pub fn register_transformation(
        &mut self,
        name: impl Into<String>,
        transformation: Arc<dyn Transformation>,
    ) {
        self.transformations.insert(name.into(), transformation);
    }

    /// Registers a stateless operator from a closure taking `(argument, input)`.
    pub fn register_operator_fn<F>(&mut self, name: impl Into<String>, pure: bool, func: F)
    where
        F: Fn(&Value, &Value) -> Result<OperatorMatch, ExternalError> + Send + Sync + 'static,
    {
        self.register_operator(
            name,
            Arc::new(FnOperator {
                func: Arc::new(func),
                pure,
            }),
        );
    }

    pub fn register_transformation_fn<F>(&mut self, name: impl Into<String>, pure: bool, func: F)
    where
        F: Fn(&Value) -> Result<Value, ExternalError> + Send + Sync + 'static,
    {
        self.register_transformation(
            name,
            Arc::new(FnTransformation {
                func: Box::new(func),
                pure,
            }),
        );
    }

    pub fn operator(&self, name: &str) -> Option<&Arc<dyn Operator>> {
        self.operators.get(name)
    }

    pub fn transformation(&self, name: &str) -> Option<&Arc<dyn Transformation>> {
        self.transformations.get(name)
    }

    pub fn operator_names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str)
    }

    pub fn transformation_names(&self) -> impl Iterator<Item = &str> {
        self.transformations.keys().map(String::as_str)
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("operators", &self.operators.keys().collect::<Vec<_>>())
            .field(
                "transformations",
                &self.transformations.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
