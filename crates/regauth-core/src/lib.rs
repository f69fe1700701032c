//! # regauth-core: Region Hierarchy for Delegated Authorization
//!
//! This crate defines the region namespace that the distributor permission
//! graph reasons about. Every other crate in the workspace depends on
//! `regauth-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Full path is identity.** A region is addressed by its dash-joined
//!    path from the root (`"India-Tamil Nadu-Keelakarai"`). The same string
//!    is the display format, the lookup key, and the input to the
//!    subregion test.
//!
//! 2. **Arena-owned tree.** The [`RegionRegistry`] owns every [`Region`].
//!    Parent and child links are [`RegionId`]s, never references, so the
//!    tree has no ownership cycles.
//!
//! 3. **Read-optimized lookups.** A flat path index duplicates the tree so
//!    that resolving a path is O(1).
//!
//! 4. **Syntactic subregion test.** [`RegionPath::is_within`] compares path
//!    segments positionally and never consults the registry.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `regauth-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod region;
pub mod registry;

// Re-export primary types for ergonomic imports.
pub use error::{AuthorizationError, RegauthError, RegionError, ValidationError};
pub use identity::DistributorId;
pub use region::{is_subregion, Region, RegionId, RegionPath, SEPARATOR};
pub use registry::RegionRegistry;
