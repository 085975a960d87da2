//! Global CLI options and environment resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pred_engine::Environment;
use pred_types::EnvironmentConfig;

/// Global options for CLI commands.
///
/// These options apply to all commands and can be set via env vars.
#[derive(Args, Debug, Clone)]
pub struct PredOpts {
    /// Var environment file (env: PRED_ENV)
    #[arg(short = 'e', long, global = true, env = "PRED_ENV")]
    pub env: Option<PathBuf>,

    /// JSON output envelope
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Suppress warnings
    #[arg(long, global = true)]
    pub quiet: bool,
}

impl PredOpts {
    /// Load the declared vars; without `--env` no var is acknowledged.
    pub fn environment(&self) -> Result<Environment> {
        let Some(path) = &self.env else {
            return Ok(Environment::new());
        };
        let config = EnvironmentConfig::from_path(path)
            .with_context(|| format!("load environment {}", path.display()))?;
        Ok(Environment::from(&config))
    }
}
