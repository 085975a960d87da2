//! Shared output helpers for human and JSON modes.
//!
//! Human mode prints text to stdout and warnings to stderr. JSON mode wraps
//! responses in `{ data, warnings? }` and respects `--pretty` and `--quiet`.

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use crate::opts::PredOpts;

/// Print a command result. `human` is the text shown outside JSON mode.
pub fn print_success(
    opts: &PredOpts,
    data: Value,
    human: &str,
    mut warnings: Vec<String>,
) -> Result<()> {
    if opts.quiet {
        warnings.clear();
    }
    if opts.pretty || opts.json {
        print_json(opts, data, warnings)
    } else {
        print_human(human, warnings)
    }
}

fn print_json(opts: &PredOpts, data: Value, warnings: Vec<String>) -> Result<()> {
    let mut root = Map::new();
    root.insert("data".into(), data);
    if !warnings.is_empty() {
        root.insert(
            "warnings".into(),
            warnings.into_iter().map(Value::String).collect(),
        );
    }
    let root = Value::Object(root);
    let text = if opts.pretty {
        serde_json::to_string_pretty(&root)
    } else {
        serde_json::to_string(&root)
    }
    .context("encode json output")?;
    println!("{text}");
    Ok(())
}

fn print_human(human: &str, warnings: Vec<String>) -> Result<()> {
    let mut stderr = std::io::stderr();
    for w in warnings {
        writeln!(stderr, "notice: {w}")?;
    }
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{human}")?;
    if !human.ends_with('\n') {
        writeln!(stdout)?;
    }
    Ok(())
}

/// JSON helper for a list of rule ids.
pub fn id_list<'a>(ids: impl IntoIterator<Item = &'a str>) -> Value {
    json!(ids.into_iter().collect::<Vec<_>>())
}
