//! # Check Subcommand
//!
//! One-shot permission query for scripts: exit status 0 when the
//! distributor may operate in the region, 1 when it may not.

use anyhow::{Context, Result};
use clap::Args;

use regauth_core::DistributorId;

use crate::{load_workspace, GlobalOpts};

/// Arguments for the `regauth check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Distributor to query.
    #[arg(long, short = 'd')]
    pub distributor: String,

    /// Region path, e.g. "India-Tamil Nadu-Keelakarai".
    #[arg(long, short = 'r')]
    pub region: String,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, opts: &GlobalOpts) -> Result<u8> {
    let workspace = load_workspace(opts)?;
    let id = DistributorId::new(&args.distributor)?;
    let region = workspace.registry.resolve(args.region.trim())?;
    let granted = workspace
        .graph
        .has_permission(&id, region)
        .with_context(|| format!("cannot check permission for {id}"))?;

    if granted {
        println!("Permission granted!");
        Ok(0)
    } else {
        println!("Permission denied!");
        Ok(1)
    }
}
