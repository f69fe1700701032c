//! # regauth CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Exit status is the handler's code, or 2 when a handler fails.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use regauth_cli::check::{run_check, CheckArgs};
use regauth_cli::list::{run_list, ListArgs};
use regauth_cli::shell::{run_shell, ShellArgs};
use regauth_cli::GlobalOpts;

/// Region authorization for distributor hierarchies.
///
/// Loads a country-province-city dataset and answers whether a distributor
/// may operate in a region, given its own grants, its exclusions, and every
/// parent above it.
#[derive(Parser, Debug)]
#[command(name = "regauth", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Seed configuration (YAML) declaring the dataset and distributors.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Region dataset (CSV). Overrides `regions_csv` in the config.
    #[arg(long, global = true)]
    regions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive menu for creating and querying distributors.
    Shell(ShellArgs),

    /// Check one distributor against one region.
    Check(CheckArgs),

    /// List distributors with their excluded and effective regions.
    List(ListArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // stdout belongs to the shell and command output.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let opts = GlobalOpts {
        config: cli.config,
        regions: cli.regions,
    };

    let result = match cli.command {
        Commands::Shell(args) => run_shell(&args, &opts),
        Commands::Check(args) => run_check(&args, &opts),
        Commands::List(args) => run_list(&args, &opts),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
