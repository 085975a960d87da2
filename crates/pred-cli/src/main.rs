mod commands;
mod opts;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::eval::EvalArgs;
use commands::RulesArgs;
use opts::PredOpts;

#[derive(Parser, Debug)]
#[command(name = "pred", version, about = "Predicate rule toolkit")]
struct Cli {
    #[command(flatten)]
    opts: PredOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a rule set and report DAG statistics
    Check(RulesArgs),

    /// Print the canonical form and identity of each rule
    Canon(RulesArgs),

    /// Render the sealed DAG as Graphviz
    Dot(RulesArgs),

    /// Drive a scripted transaction through a rule set
    Eval(EvalArgs),
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let opts = &cli.opts;

    match cli.command {
        Command::Check(args) => commands::check::cmd_check(opts, &args),
        Command::Canon(args) => commands::canon::cmd_canon(opts, &args),
        Command::Dot(args) => commands::dot::cmd_dot(opts, &args),
        Command::Eval(args) => commands::eval::cmd_eval(opts, &args),
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}
