//! # Error Hierarchy
//!
//! Structured error types for region resolution and permission checks,
//! built with `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Only two failure kinds reach callers of the permission engine: a region
//! path that does not resolve ([`RegionError::NotFound`]) and a region grant
//! that some parent distributor does not cover ([`AuthorizationError::Denied`]).
//! Everything else is total over its inputs.

use thiserror::Error;

/// Top-level error type for the region authorization engine.
#[derive(Error, Debug)]
pub enum RegauthError {
    /// Region path resolution or construction failure.
    #[error("region error: {0}")]
    Region(#[from] RegionError),

    /// A grant was refused by the parent gate.
    #[error("authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building or resolving region paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// The path was never registered in the region registry.
    #[error("region not found: \"{0}\"")]
    NotFound(String),

    /// A path segment contains the path separator and would be misparsed.
    #[error("region segment \"{segment}\" contains the path separator '{separator}'")]
    EmbeddedSeparator {
        /// The offending segment.
        segment: String,
        /// The reserved separator character.
        separator: char,
    },
}

/// Errors raised when a distributor is refused a region.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// At least one parent distributor does not currently grant the region.
    #[error("cannot add region {region} to {distributor}: not authorized by all parent distributors")]
    Denied {
        /// The distributor that requested the region.
        distributor: String,
        /// Full path of the requested region.
        region: String,
    },
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Distributor identifier is empty or whitespace-only.
    #[error("invalid distributor ID: must be non-empty")]
    EmptyDistributorId,
}
