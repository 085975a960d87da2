pub mod canon;
pub mod check;
pub mod dot;
pub mod eval;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pred_engine::{Builder, Catalog, Dag};
use pred_types::RuleSet;

use crate::opts::PredOpts;

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Rule set file (JSON)
    pub rules: PathBuf,
}

/// A rule set built against the standard catalogue.
pub struct Loaded {
    pub rules: RuleSet,
    pub dag: Dag,
    /// Distinct nodes interned before optimization.
    pub interned: usize,
}

impl Loaded {
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.rules.iter().map(|rule| rule.id.as_str())
    }
}

pub fn load_rules(opts: &PredOpts, path: &Path) -> Result<Loaded> {
    let env = opts.environment()?;
    let rules = RuleSet::from_path(path)
        .with_context(|| format!("load rules {}", path.display()))?;
    let catalog = Catalog::with_standard();
    let mut builder = Builder::new(&env, &catalog);
    for template in rules.templates.iter().cloned() {
        builder
            .add_template(template)
            .context("register template")?;
    }
    for rule in &rules.rules {
        builder
            .add_root(&rule.expr)
            .with_context(|| format!("build rule '{}'", rule.id))?;
    }
    let interned = builder.interned();
    let dag = builder.finish().context("seal rule set")?;
    Ok(Loaded {
        rules,
        dag,
        interned,
    })
}
