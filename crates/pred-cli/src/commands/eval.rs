//! `pred eval` command: drive a scripted transaction phase by phase.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pred_engine::{MemoryVarSource, RootId};
use pred_types::TransactionScript;
use serde_json::{Value, json};

use crate::commands::{Loaded, load_rules};
use crate::opts::PredOpts;
use crate::output::{id_list, print_success};

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Rule set file (JSON)
    pub rules: PathBuf,

    /// Transaction script file (JSON)
    pub transaction: PathBuf,

    /// Append a Graphviz rendering of the final node states
    #[arg(long)]
    pub dot: bool,
}

pub fn cmd_eval(opts: &PredOpts, args: &EvalArgs) -> Result<()> {
    let loaded = load_rules(opts, &args.rules)?;
    let script = TransactionScript::from_path(&args.transaction)
        .with_context(|| format!("load transaction {}", args.transaction.display()))?;
    let dag = &loaded.dag;

    let mut source = MemoryVarSource::new();
    let mut ctx = dag.new_context();
    let mut warnings = Vec::new();
    let mut phases = Vec::new();
    let mut human = String::new();

    for step in &script.phases {
        for (name, snapshot) in &step.vars {
            if !dag
                .vars()
                .iter()
                .any(|var| dag.node(*var).as_var().is_some_and(|v| v.name == *name))
            {
                warnings.push(format!("phase {}: var '{name}' is not used", step.phase));
            }
            source.apply(name, snapshot);
        }
        let report = ctx
            .advance_phase(step.phase, &source)
            .with_context(|| format!("advance to phase {}", step.phase))?;

        let ready = rule_names(&loaded, &report.ready);
        let finished = rule_names(&loaded, &report.finished);
        writeln!(
            human,
            "{}: ready [{}] finished [{}] ({} evaluated)",
            step.phase,
            ready.join(", "),
            finished.join(", "),
            report.evaluated
        )?;
        phases.push(json!({
            "phase": step.phase,
            "ready": id_list(ready.iter().copied()),
            "finished": id_list(finished.iter().copied()),
            "evaluated": report.evaluated,
        }));
    }

    let mut rules = Vec::new();
    for (index, id) in loaded.rule_ids().enumerate() {
        let view = ctx.query(dag.roots()[index]);
        let state = if view.finished { "finished" } else { "open" };
        let values = view.values.iter().map(ToString::to_string).collect::<Vec<_>>();
        writeln!(
            human,
            "{id}: {} {state} [{}]",
            if view.is_truthy() { "true" } else { "false" },
            values.join(" ")
        )?;
        rules.push(json!({
            "id": id,
            "truthy": view.is_truthy(),
            "finished": view.finished,
            "values": serde_json::to_value(view.values.as_slice())?,
        }));
    }

    let mut data = json!({ "phases": phases, "rules": rules });
    if args.dot {
        let dot = ctx.to_dot();
        human.push_str(&dot);
        if let Some(object) = data.as_object_mut() {
            object.insert("dot".into(), Value::String(dot));
        }
    }
    print_success(opts, data, &human, warnings)
}

fn rule_names<'a>(loaded: &'a Loaded, roots: &[RootId]) -> Vec<&'a str> {
    roots
        .iter()
        .filter_map(|root| loaded.rules.rules.get(root.index()))
        .map(|rule| rule.id.as_str())
        .collect()
}
