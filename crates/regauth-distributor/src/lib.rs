//! # regauth-distributor: Delegated Permission Graph
//!
//! Maintains, for every distributor, the set of regions it may actually
//! operate in after applying parent constraints and local exclusions, and
//! keeps that set consistent as the graph changes.
//!
//! ## Model
//!
//! - **Distributor** (`distributor.rs`): authorized, excluded, and derived
//!   effective region sets plus id-keyed parent and child links.
//!
//! - **Graph** (`graph.rs`): the arena of all distributors. Every mutation
//!   (`add_region`, `remove_region`, `exclude_region`, `add_parent`)
//!   recomputes the touched distributor and then each of its descendants
//!   exactly once, parents before children.
//!
//! ## Design
//!
//! Parent/child relations are stored as [`DistributorId`] sets on both ends,
//! never as references, so the graph has no ownership cycles. Logical cycles
//! are refused at link time; see [`GraphError::CycleDetected`].
//!
//! The graph is single-writer: callers needing shared access must wrap each
//! mutating call, including its propagation, in one lock.

pub mod distributor;
pub mod graph;

pub use distributor::{allowed_by_all_parents, Distributor};
pub use graph::{DistributorGraph, GraphError};
pub use regauth_core::DistributorId;
