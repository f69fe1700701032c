//! # Seed Configuration
//!
//! A YAML file that points at the region dataset and declares an initial
//! distributor graph, so a session can start from a known state instead of
//! being rebuilt by hand through the menu every run.
//!
//! ```yaml
//! regions_csv: cities.csv            # relative to this file
//! regions:                           # extra paths registered directly
//!   - "India-Tamil Nadu-Keelakarai"
//! distributors:
//!   - id: DIST1
//!     name: National
//!     regions: ["India"]
//!     exclude: ["India-Kerala"]
//!   - id: DIST2
//!     name: Southern
//!     regions: ["India-Tamil Nadu"]
//!     parents: [DIST1]
//! ```
//!
//! Seeding happens in three passes: every distributor is created with its
//! initial regions, then parent links are made in file order, then
//! exclusions are applied. Unknown region paths are skipped with a warning;
//! structural mistakes (bad ids, unknown parents, cycles) abort the load.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use regauth_core::{DistributorId, Region, RegionRegistry};
use regauth_distributor::DistributorGraph;

/// Top-level seed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Region dataset to load, relative to the config file.
    #[serde(default)]
    pub regions_csv: Option<PathBuf>,

    /// Region paths to register in addition to the dataset.
    #[serde(default)]
    pub regions: Vec<String>,

    /// Distributors to create.
    #[serde(default)]
    pub distributors: Vec<DistributorSeed>,
}

/// One distributor declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributorSeed {
    /// Unique distributor id.
    pub id: String,
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Initially authorized region paths.
    #[serde(default)]
    pub regions: Vec<String>,
    /// Excluded region paths.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Ids of parent distributors.
    #[serde(default)]
    pub parents: Vec<String>,
}

/// What seeding did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Distributors created.
    pub distributors: usize,
    /// Region paths that did not resolve and were dropped.
    pub skipped_regions: Vec<String>,
}

impl SeedConfig {
    /// Parse a seed file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid seed document.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: SeedConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config YAML: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            distributors = config.distributors.len(),
            "loaded seed config"
        );
        Ok(config)
    }

    /// Build the declared distributor graph on top of `registry`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid or duplicate id, an unknown parent id, or a
    /// parent link that would form a cycle.
    pub fn apply(&self, registry: &RegionRegistry, graph: &mut DistributorGraph) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for seed in &self.distributors {
            let id = DistributorId::new(&seed.id)
                .with_context(|| format!("invalid distributor id \"{}\"", seed.id))?;
            let regions = resolve_all(registry, &seed.regions, &mut report);
            let name = seed.name.clone().unwrap_or_else(|| id.to_string());
            graph
                .create_distributor(id, name, regions)
                .with_context(|| format!("failed to create distributor {}", seed.id))?;
            report.distributors += 1;
        }

        for seed in &self.distributors {
            let child = DistributorId::new(&seed.id)?;
            for parent in &seed.parents {
                let parent_id = DistributorId::new(parent)
                    .with_context(|| format!("invalid parent id \"{parent}\" on {child}"))?;
                graph
                    .add_parent(&child, Some(&parent_id))
                    .with_context(|| format!("failed to link {parent_id} as parent of {child}"))?;
            }
        }

        for seed in &self.distributors {
            let id = DistributorId::new(&seed.id)?;
            for region in resolve_all(registry, &seed.exclude, &mut report) {
                graph.exclude_region(&id, region)?;
            }
        }

        Ok(report)
    }
}

fn resolve_all<'r>(
    registry: &'r RegionRegistry,
    paths: &[String],
    report: &mut SeedReport,
) -> Vec<&'r Region> {
    let mut regions = Vec::with_capacity(paths.len());
    for path in paths {
        match registry.resolve(path.trim()) {
            Ok(region) => regions.push(region),
            Err(e) => {
                tracing::warn!("skipping seed region: {e}");
                report.skipped_regions.push(path.clone());
            }
        }
    }
    regions
}
