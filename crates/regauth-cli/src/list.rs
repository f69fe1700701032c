//! # List Subcommand
//!
//! Prints every distributor with its excluded and effective regions, either
//! as the plain-text block the shell uses or as a JSON array.

use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use regauth_core::RegionPath;
use regauth_distributor::Distributor;

use crate::{load_workspace, GlobalOpts};

/// Arguments for the `regauth list` subcommand.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// One distributor as rendered by `list --json`.
#[derive(Debug, Serialize)]
struct DistributorView<'a> {
    id: &'a str,
    name: &'a str,
    authorized: Vec<&'a str>,
    excluded: Vec<&'a str>,
    inherited_excluded: Vec<&'a str>,
    effective: Vec<&'a str>,
    parents: Vec<&'a str>,
}

impl<'a> From<&'a Distributor> for DistributorView<'a> {
    fn from(d: &'a Distributor) -> Self {
        Self {
            id: d.id().as_str(),
            name: d.name(),
            authorized: d.authorized_regions().iter().map(|p| p.as_str()).collect(),
            excluded: d.excluded_regions().iter().map(|p| p.as_str()).collect(),
            inherited_excluded: d.inherited_exclusions().iter().map(|p| p.as_str()).collect(),
            effective: d.effective_regions().iter().map(|p| p.as_str()).collect(),
            parents: d.parents().iter().map(|p| p.as_str()).collect(),
        }
    }
}

/// Execute the list subcommand.
pub fn run_list(args: &ListArgs, opts: &GlobalOpts) -> Result<u8> {
    let workspace = load_workspace(opts)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let distributors = workspace.graph.iter();

    if args.json {
        write_json(&mut out, distributors)?;
    } else {
        for distributor in distributors {
            write_distributor(&mut out, distributor)?;
        }
    }
    Ok(0)
}

/// Render one distributor as a text block.
///
/// ```text
/// ID: DIST2, Name: Southern
/// Excluded Regions: India-Tamil Nadu-Chennai
/// Effective Authorized Regions: India-Tamil Nadu
/// ```
pub fn write_distributor<W: Write>(out: &mut W, distributor: &Distributor) -> io::Result<()> {
    let join = |paths: &BTreeSet<RegionPath>| {
        paths
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    writeln!(out, "ID: {}, Name: {}", distributor.id(), distributor.name())?;
    writeln!(out, "Excluded Regions: {}", join(distributor.excluded_regions()))?;
    writeln!(
        out,
        "Effective Authorized Regions: {}",
        join(distributor.effective_regions())
    )
}

/// Render distributors as a pretty-printed JSON array.
pub fn write_json<'a, W: Write>(
    out: &mut W,
    distributors: impl IntoIterator<Item = &'a Distributor>,
) -> Result<()> {
    let views: Vec<DistributorView<'_>> = distributors.into_iter().map(Into::into).collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regauth_core::{DistributorId, RegionRegistry};
    use regauth_distributor::DistributorGraph;

    fn graph() -> DistributorGraph {
        let mut registry = RegionRegistry::new();
        registry.add_region("India-Tamil Nadu-Chennai");
        registry.add_region("India-Tamil Nadu-Keelakarai");
        let tn = registry.get_region("India-Tamil Nadu").unwrap();
        let chennai = registry.get_region("India-Tamil Nadu-Chennai").unwrap();

        let mut graph = DistributorGraph::new();
        let id = DistributorId::new("DIST2").unwrap();
        graph.create_distributor(id.clone(), "Southern", [tn]).unwrap();
        graph.exclude_region(&id, chennai).unwrap();
        graph
    }

    #[test]
    fn text_block_layout() {
        let graph = graph();
        let mut out = Vec::new();
        for d in graph.iter() {
            write_distributor(&mut out, d).unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ID: DIST2, Name: Southern\n\
             Excluded Regions: India-Tamil Nadu-Chennai\n\
             Effective Authorized Regions: India-Tamil Nadu\n"
        );
    }

    #[test]
    fn json_lists_all_sets() {
        let graph = graph();
        let mut out = Vec::new();
        write_json(&mut out, graph.iter()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "DIST2");
        assert_eq!(first["excluded"][0], "India-Tamil Nadu-Chennai");
        assert_eq!(first["effective"][0], "India-Tamil Nadu");
        assert!(first["parents"].as_array().unwrap().is_empty());
        assert!(first["inherited_excluded"].as_array().unwrap().is_empty());
    }

    #[test]
    fn json_of_empty_graph_is_empty_array() {
        let graph = DistributorGraph::new();
        let mut out = Vec::new();
        write_json(&mut out, graph.iter()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }
}
