//! Predicate data model: values, value lists, phases, node identities,
//! front-end expression trees and the JSON configuration documents.

pub mod canonical;
pub mod config;
mod expr;
mod identity;
mod phase;
mod value;

pub use config::{
    ConfigError, EnvironmentConfig, PhaseStep, RuleDef, RuleSet, TransactionScript, VarDecl,
    VarSnapshot,
};
pub use expr::{Expr, ExprCall, ExprLiteral, ExprRef, ExprVar, Template};
pub use identity::{IDENTITY_PREFIX, Identity};
pub use phase::{InvertedWindow, Phase, PhaseWindow, UnknownPhase};
pub use value::{Value, ValueData, ValueList};

#[cfg(test)]
mod tests;
