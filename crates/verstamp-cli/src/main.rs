//! verstamp CLI
//!
//! Keeps the version record of a product consistent across its manifests.

mod cli;
mod commands;
mod context;
mod error;

use std::io;
use std::path::Path;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use error::Result;
use verstamp_core::{SyncEngine, SyncOptions};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir()?;
    let root = context::resolve_root(cli.root.clone(), &cwd);
    tracing::debug!(root = %root.display(), "resolved project root");

    execute_command(&root, cli.command)
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(verbose)
        .compact();

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!("Verbose mode enabled");
    }
}

/// Dispatch one command. Only commands that work on a checkout open the
/// project, so `classify` and `completions` run anywhere.
fn execute_command(root: &Path, cmd: Commands) -> Result<()> {
    let open = || SyncEngine::open(root);
    let options = |dry_run: bool| SyncOptions { dry_run };

    match cmd {
        Commands::Get => commands::run_get(&open()?),
        Commands::GetSemantic => commands::run_get_semantic(&open()?),
        Commands::GetBuild => commands::run_get_build(&open()?),
        Commands::Info { json } => commands::run_info(&open()?, json),
        Commands::Validate => commands::run_validate(&open()?),
        Commands::Increment { kind, dry_run } => {
            let report = open()?.increment(kind, options(dry_run))?;
            commands::print_report(&report);
            Ok(())
        }
        Commands::Prepare { kind, dry_run } => {
            let report = open()?.prepare(kind, options(dry_run))?;
            commands::print_report(&report);
            Ok(())
        }
        Commands::Set { version, dry_run } => {
            let report = open()?.set(&version, options(dry_run))?;
            commands::print_report(&report);
            Ok(())
        }
        Commands::Inject { dry_run } => {
            let report = open()?.inject(options(dry_run))?;
            commands::print_report(&report);
            Ok(())
        }
        Commands::Restore => commands::run_restore(&mut open()?),
        Commands::Cleanup => commands::run_cleanup(&mut open()?),
        Commands::Check { json } => commands::run_check(&open()?, json),
        Commands::Backups => commands::run_backups(&open()?),
        Commands::Classify { old, new, json } => commands::run_classify(&old, &new, json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "verstamp", &mut io::stdout());
            Ok(())
        }
    }
}
