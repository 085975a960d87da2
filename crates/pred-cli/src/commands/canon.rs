//! `pred canon` command.

use std::fmt::Write;

use anyhow::Result;
use serde_json::{Value, json};

use crate::commands::{RulesArgs, load_rules};
use crate::opts::PredOpts;
use crate::output::print_success;

pub fn cmd_canon(opts: &PredOpts, args: &RulesArgs) -> Result<()> {
    let loaded = load_rules(opts, &args.rules)?;
    let dag = &loaded.dag;

    let mut human = String::new();
    let mut entries = Vec::new();
    for (id, root) in loaded.rule_ids().zip(dag.roots()) {
        let canonical = dag.to_s(*root);
        let identity = dag.node(*root).identity();
        writeln!(human, "{id}\t{}\t{canonical}", identity.short())?;
        entries.push(json!({
            "id": id,
            "identity": identity.to_hex(),
            "canonical": canonical,
        }));
    }
    print_success(opts, Value::Array(entries), &human, Vec::new())
}
