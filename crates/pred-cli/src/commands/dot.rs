//! `pred dot` command.

use anyhow::Result;
use serde_json::Value;

use crate::commands::{RulesArgs, load_rules};
use crate::opts::PredOpts;
use crate::output::print_success;

pub fn cmd_dot(opts: &PredOpts, args: &RulesArgs) -> Result<()> {
    let loaded = load_rules(opts, &args.rules)?;
    let dot = loaded.dag.to_dot();
    print_success(opts, Value::String(dot.clone()), &dot, Vec::new())
}
