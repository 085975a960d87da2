use pred_types::Phase;
use thiserror::Error;

/// Configuration-time failure; the whole rule set is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid argument count for {function}: expected {expected}, got {actual}")]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },
    #[error("type error in {function} argument {index}: expected {expected}, got {actual}")]
    Type {
        function: String,
        index: usize,
        expected: &'static str,
        actual: String,
    },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("unknown var '{0}'")]
    UnknownVar(String),
    #[error("var '{0}' has no phase window; declare one in the environment or the expression")]
    MissingPhaseWindow(String),
    #[error("invalid argument for {function}: {message}")]
    InvalidArgument { function: String, message: String },
    #[error("literal {0} is not a finite number")]
    NonFiniteLiteral(String),
    #[error("template recursion: {}", chain.join(" -> "))]
    TemplateRecursion { chain: Vec<String> },
    #[error("unbound reference '{0}'")]
    UnboundReference(String),
    #[error("template '{0}' is already defined")]
    DuplicateTemplate(String),
    #[error("expression graph contains a cycle")]
    CyclicReference,
}

/// Failure reported by the evaluator to the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("phase {next} delivered after {previous}; phases must strictly increase")]
    PhaseOrder { previous: Phase, next: Phase },
}
