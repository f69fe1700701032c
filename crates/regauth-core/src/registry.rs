//! # Region Registry
//!
//! Owns the region tree and a flat index from full path to region, kept in
//! lockstep so that every node reachable from the root has exactly one index
//! entry and vice versa.
//!
//! Reads (permission checks resolve region paths on every query) vastly
//! outnumber writes (regions are registered once from a reference dataset),
//! so lookups go through the flat index in O(1) instead of walking the tree.
//!
//! Regions are stored in an arena and never removed, so a [`RegionId`] stays
//! valid for the lifetime of the registry.

use std::collections::HashMap;

use crate::error::RegionError;
use crate::region::{Region, RegionId, SEPARATOR};

/// The region tree plus its full-path index.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    regions: Vec<Region>,
    index: HashMap<String, RegionId>,
}

impl RegionRegistry {
    /// Create a registry holding only the synthetic root (empty path).
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), RegionId::ROOT);
        Self {
            regions: vec![Region::root()],
            index,
        }
    }

    /// Register a dash-delimited path, creating every missing intermediate
    /// region along the way, and return the region for the full path.
    ///
    /// Idempotent: registering the same path twice returns the same node.
    /// Consecutive or trailing separators produce regions named `""`. An
    /// empty first segment names the root itself, so `""` returns the root
    /// and `"-India"` resolves to `"India"`.
    pub fn add_region(&mut self, path: &str) -> &Region {
        let mut current = RegionId::ROOT;
        if !path.is_empty() {
            for segment in path.split(SEPARATOR) {
                current = self.child_or_insert(current, segment);
            }
        }
        &self.regions[current.0]
    }

    fn child_or_insert(&mut self, parent: RegionId, segment: &str) -> RegionId {
        let parent_region = &self.regions[parent.0];
        if let Some(child) = parent_region.child(segment) {
            return child;
        }

        let full_path = parent_region.full_path().join_unchecked(segment);
        if full_path.is_root() {
            return RegionId::ROOT;
        }

        let id = RegionId(self.regions.len());
        tracing::debug!(region = %full_path, "registered region");
        self.index.insert(full_path.as_str().to_string(), id);
        self.regions.push(Region::new(id, segment, full_path, parent));
        self.regions[parent.0].link_child(segment, id);
        id
    }

    /// Look up a region by its full path.
    pub fn get_region(&self, path: &str) -> Option<&Region> {
        self.index.get(path).and_then(|id| self.get(*id))
    }

    /// Look up a region by its full path, failing with a typed error.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::NotFound`] if the path was never registered.
    pub fn resolve(&self, path: &str) -> Result<&Region, RegionError> {
        self.get_region(path)
            .ok_or_else(|| RegionError::NotFound(path.to_string()))
    }

    /// Whether the full path is registered.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Look up a region by arena id.
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    /// The synthetic root region.
    pub fn root(&self) -> &Region {
        &self.regions[RegionId::ROOT.0]
    }

    /// The parent of `region`, or `None` for the root.
    pub fn parent_of(&self, region: &Region) -> Option<&Region> {
        region.parent().and_then(|id| self.get(id))
    }

    /// Direct children of `region`, ordered by segment name.
    pub fn children_of<'a>(&'a self, region: &'a Region) -> impl Iterator<Item = &'a Region> + 'a {
        region.children().values().filter_map(move |id| self.get(*id))
    }

    /// Every registered region except the root, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().skip(1)
    }

    /// Number of registered regions, not counting the root.
    pub fn len(&self) -> usize {
        self.regions.len() - 1
    }

    /// Whether no region besides the root has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
