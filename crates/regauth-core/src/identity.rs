//! # Distributor Identity
//!
//! Newtype wrapper for distributor identifiers. A distributor id is the
//! key of the permission graph, so it is validated once at construction
//! and compared by value everywhere else.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unique identifier of a distributor principal (e.g. `"DIST1"`).
///
/// # Validation
///
/// Must be non-empty after trimming surrounding whitespace. The trimmed
/// form is stored, so `" DIST1 "` and `"DIST1"` name the same distributor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistributorId(String);

impl DistributorId {
    /// Create a distributor identifier, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDistributorId`] if the string is
    /// empty or whitespace-only.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDistributorId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DistributorId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DistributorId> for String {
    fn from(id: DistributorId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DistributorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distributor_id_valid() {
        let id = DistributorId::new("DIST1").unwrap();
        assert_eq!(id.as_str(), "DIST1");
    }

    #[test]
    fn distributor_id_trims_whitespace() {
        let id = DistributorId::new("  DIST1\t").unwrap();
        assert_eq!(id, DistributorId::new("DIST1").unwrap());
    }

    #[test]
    fn distributor_id_rejects_empty() {
        assert!(DistributorId::new("").is_err());
        assert!(DistributorId::new("   ").is_err());
    }

    #[test]
    fn distributor_id_serde_validates() {
        let id: DistributorId = serde_json::from_str("\"P1\"").unwrap();
        assert_eq!(id.as_str(), "P1");
        assert!(serde_json::from_str::<DistributorId>("\"  \"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P1\"");
    }
}
