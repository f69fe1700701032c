//! # regauth-cli: Region Authorization Command-Line Interface
//!
//! Provides the `regauth` binary: loads the region dataset, optionally seeds
//! a distributor graph from a YAML file, and then either runs the
//! interactive menu or answers a single query.
//!
//! ## Subcommands
//!
//! - `regauth shell`: interactive menu over the graph.
//! - `regauth check`: exit 0 if a distributor may operate in a region, 1 if not.
//! - `regauth list`: print every distributor, optionally as JSON.
//!
//! ```bash
//! regauth --regions cities.csv shell
//! regauth --config seed.yaml check -d DIST2 -r "India-Tamil Nadu-Keelakarai"
//! regauth --config seed.yaml list --json
//! ```

pub mod check;
pub mod config;
pub mod dataset;
pub mod list;
pub mod shell;

use std::path::{Path, PathBuf};

use anyhow::Result;

use regauth_core::RegionRegistry;
use regauth_distributor::DistributorGraph;

use crate::config::SeedConfig;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Seed configuration file.
    pub config: Option<PathBuf>,
    /// Region dataset; overrides `regions_csv` from the config.
    pub regions: Option<PathBuf>,
}

/// A loaded registry and the graph built on top of it.
#[derive(Debug, Default)]
pub struct Workspace {
    pub registry: RegionRegistry,
    pub graph: DistributorGraph,
}

/// Load the region dataset and seed the graph as `opts` directs.
///
/// # Errors
///
/// Fails if the config or dataset cannot be read, or if seeding fails.
pub fn load_workspace(opts: &GlobalOpts) -> Result<Workspace> {
    let mut workspace = Workspace::default();

    let (config, base) = match &opts.config {
        Some(path) => {
            let base = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (SeedConfig::load(path)?, base)
        }
        None => (SeedConfig::default(), PathBuf::from(".")),
    };

    let dataset = match (&opts.regions, &config.regions_csv) {
        (Some(cli), _) => Some(cli.clone()),
        (None, Some(from_config)) => Some(resolve_path(from_config, &base)),
        (None, None) => None,
    };
    match dataset {
        Some(path) => {
            dataset::load_regions_file(&path, &mut workspace.registry)?;
        }
        None => tracing::warn!("no region dataset configured; registry starts empty"),
    }

    for path in &config.regions {
        workspace.registry.add_region(path.trim());
    }

    let report = config.apply(&workspace.registry, &mut workspace.graph)?;
    tracing::info!(
        regions = workspace.registry.len(),
        distributors = report.distributors,
        skipped_regions = report.skipped_regions.len(),
        "workspace ready"
    );
    Ok(workspace)
}

/// Resolve a path that may be relative to a base directory.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `base` resolves there; otherwise it is left relative to the current
/// directory.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let based = base.join(path);
    if based.exists() {
        based
    } else {
        path.to_path_buf()
    }
}
