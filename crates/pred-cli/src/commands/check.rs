//! `pred check` command.

use std::collections::HashSet;

use anyhow::Result;
use serde_json::json;

use crate::commands::{RulesArgs, load_rules};
use crate::opts::PredOpts;
use crate::output::print_success;

pub fn cmd_check(opts: &PredOpts, args: &RulesArgs) -> Result<()> {
    let loaded = load_rules(opts, &args.rules)?;
    let dag = &loaded.dag;
    let distinct_roots = dag.roots().iter().collect::<HashSet<_>>().len();
    let rules = loaded.rules.rules.len();

    let mut warnings = Vec::new();
    if distinct_roots < rules {
        warnings.push(format!(
            "{} rule(s) share a root with an earlier rule",
            rules - distinct_roots
        ));
    }

    let data = json!({
        "rules": rules,
        "templates": loaded.rules.templates.len(),
        "distinct_roots": distinct_roots,
        "interned_nodes": loaded.interned,
        "nodes": dag.len(),
        "vars": dag.vars().len(),
    });
    let human = format!(
        "ok: {rules} rules, {distinct_roots} distinct roots, {} nodes ({} interned), {} vars",
        dag.len(),
        loaded.interned,
        dag.vars().len()
    );
    print_success(opts, data, &human, warnings)
}
