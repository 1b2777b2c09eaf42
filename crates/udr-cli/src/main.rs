//! udr CLI
//!
//! Keeps route tables in step with the published service tag address
//! ranges: one route per prefix, named so later runs can find and refresh it.

mod cli;
mod commands;
mod config;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::Context;
use error::Result;
use udr_core::Operation;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    // Logs go to stderr so --json output stays parseable
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        // No command provided - show help hint
        println!("{} service tag route reconciler", "udr".green().bold());
        println!();
        println!("Run {} for available commands.", "udr --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let ctx = Context::load(cli.config.as_deref(), &cwd, cli.source, cli.backend)?;
    execute_command(&ctx, command)
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Add(args) => commands::run_reconcile(ctx, &args, Operation::Sync),
        Commands::Remove(args) => commands::run_reconcile(ctx, &args, Operation::Remove),
        Commands::Status {
            table,
            cloud,
            prefix,
            json,
        } => commands::run_status(ctx, &table, cloud.as_deref(), prefix.as_deref(), json),
        Commands::Tags {
            cloud,
            filter,
            json,
        } => commands::run_tags(ctx, cloud.as_deref(), filter.as_deref(), json),
    }
}
