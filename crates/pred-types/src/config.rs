//! JSON configuration documents: var declarations, rule sets and scripted
//! transactions.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expr::{Expr, Template};
use crate::phase::{Phase, PhaseWindow};
use crate::value::Value;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Vars the host acknowledges, each with an optional default phase window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub vars: Vec<VarDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<PhaseWindow>,
}

impl EnvironmentConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load_json(path)?;
        config.check_unique()?;
        Ok(config)
    }

    pub fn check_unique(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for decl in &self.vars {
            if !seen.insert(decl.name.as_str()) {
                return Err(ConfigError::Duplicate {
                    kind: "var",
                    name: decl.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Templates plus identified top-level rules, in evaluation-independent order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub id: String,
    pub expr: Expr,
}

impl RuleSet {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let rules: Self = load_json(path)?;
        let mut seen = std::collections::HashSet::new();
        for rule in &rules.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::Duplicate {
                    kind: "rule",
                    name: rule.id.clone(),
                });
            }
        }
        Ok(rules)
    }
}

/// Phase-by-phase var snapshots; each snapshot holds the cumulative values
/// seen so far for that var.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionScript {
    #[serde(default)]
    pub phases: Vec<PhaseStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseStep {
    pub phase: Phase,
    #[serde(default)]
    pub vars: IndexMap<String, VarSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VarSnapshot {
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub finished: bool,
}

impl TransactionScript {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }
}
