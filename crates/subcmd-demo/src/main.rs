//! `subcmd-demo`: a small roster tool whose subcommands are dispatched by
//! `subcmd`.
//!
//! ```text
//! subcmd-demo list -managers
//! subcmd-demo add -title cto mia
//! subcmd-demo tag -tags oncall,infra ada
//! subcmd-demo team size
//! subcmd-demo help add
//! ```
//!
//! Unknown subcommands run `subcmd-demo-NAME` from `PATH` when it exists.
//! Set `RUST_LOG=subcmd=debug` to trace binding and dispatch.

mod commands;
mod roster;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use subcmd::{Context, Extensions};
use tracing_subscriber::EnvFilter;

use crate::commands::{usage_of, App};
use crate::roster::Roster;

#[derive(Parser, Debug)]
#[command(name = "subcmd-demo", version, about = "A small roster tool")]
struct Cli {
    /// YAML roster to load instead of the built-in sample
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Skip the handler signature check before dispatch
    #[arg(long)]
    no_check: bool,

    /// Subcommand and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let roster = match &cli.file {
        Some(path) => Roster::load(path)?,
        None => Roster::sample(),
    };
    let mut state = Extensions::new();
    state.insert(roster);

    let ctx = Context::new()
        .with_program("subcmd-demo")
        .with_state(state)
        .with_suppress_check(cli.no_check);
    let app = App::new(cli.file)?;

    match subcmd::run(&ctx, &app, cli.args.as_slice()) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            if let Some(usage) = usage_of(&err) {
                eprint!("{}", usage.detail());
                return Ok(ExitCode::from(2));
            }
            if err.is_usage() {
                eprintln!("{err}");
                return Ok(ExitCode::from(2));
            }
            Err(err.into())
        }
    }
}
