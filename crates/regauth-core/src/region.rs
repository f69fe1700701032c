//! # Region Paths and Nodes
//!
//! A region is a node in a fixed geographic hierarchy (country, province,
//! city) addressed by its full dash-joined path from the root, e.g.
//! `"India-Tamil Nadu-Keelakarai"`. The full path is both the display
//! format and the identity key of a region.
//!
//! ## Path Grammar
//!
//! ```text
//! path    := ""                      (the implicit root)
//!          | segment ("-" segment)*
//! segment := any text without '-'   (may be empty)
//! ```
//!
//! No escaping is defined, so [`RegionPath::from_segments`] rejects segments
//! that contain the separator instead of silently producing a different path.
//!
//! ## Subregion Test
//!
//! [`RegionPath::is_within`] is purely syntactic: a path lies within a
//! reference path when the reference's segments are a positional prefix of
//! its own. Every path lies within the root and within itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RegionError;

/// The reserved path separator.
pub const SEPARATOR: char = '-';

/// A canonical dash-joined region path. The empty path denotes the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionPath(String);

impl RegionPath {
    /// The root path (empty string).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Wrap a path string verbatim. Parsing never fails: consecutive
    /// separators simply yield empty segments.
    pub fn parse(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Join segments into a path.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmbeddedSeparator`] if any segment contains
    /// [`SEPARATOR`].
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, RegionError> {
        let mut joined = Vec::with_capacity(segments.len());
        for segment in segments {
            let segment = segment.as_ref();
            check_segment(segment)?;
            joined.push(segment);
        }
        Ok(Self(joined.join(&SEPARATOR.to_string())))
    }

    /// The path of the child named `segment` under this path.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmbeddedSeparator`] if `segment` contains
    /// [`SEPARATOR`].
    pub fn child(&self, segment: &str) -> Result<Self, RegionError> {
        check_segment(segment)?;
        Ok(self.join_unchecked(segment))
    }

    pub(crate) fn join_unchecked(&self, segment: &str) -> Self {
        if self.is_root() {
            Self(segment.to_string())
        } else {
            Self(format!("{}{SEPARATOR}{segment}", self.0))
        }
    }

    /// Access the path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path segments, root first. The root has no segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        (!self.is_root())
            .then(|| self.0.split(SEPARATOR))
            .into_iter()
            .flatten()
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment, or `""` for the root.
    pub fn name(&self) -> &str {
        self.0
            .rsplit_once(SEPARATOR)
            .map_or(self.0.as_str(), |(_, name)| name)
    }

    /// The syntactic parent path. `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rsplit_once(SEPARATOR) {
            Some((parent, _)) => Self(parent.to_string()),
            None => Self::root(),
        })
    }

    /// Whether this path equals `reference` or lies beneath it.
    pub fn is_within(&self, reference: &RegionPath) -> bool {
        if reference.is_root() {
            return true;
        }
        let mut tokens = self.segments();
        reference.segments().all(|token| tokens.next() == Some(token))
    }
}

impl std::fmt::Display for RegionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegionPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn check_segment(segment: &str) -> Result<(), RegionError> {
    if segment.contains(SEPARATOR) {
        return Err(RegionError::EmbeddedSeparator {
            segment: segment.to_string(),
            separator: SEPARATOR,
        });
    }
    Ok(())
}

/// Stable arena index of a region inside its [`RegionRegistry`](crate::RegionRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegionId(pub(crate) usize);

impl RegionId {
    /// The root region's id.
    pub const ROOT: RegionId = RegionId(0);

    /// The raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An immutable node of the region tree.
///
/// Parent and child links are arena ids, not ownership: the registry owns
/// every region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    id: RegionId,
    name: String,
    full_path: RegionPath,
    parent: Option<RegionId>,
    children: BTreeMap<String, RegionId>,
}

impl Region {
    pub(crate) fn root() -> Self {
        Self {
            id: RegionId::ROOT,
            name: String::new(),
            full_path: RegionPath::root(),
            parent: None,
            children: BTreeMap::new(),
        }
    }

    pub(crate) fn new(id: RegionId, name: &str, full_path: RegionPath, parent: RegionId) -> Self {
        Self {
            id,
            name: name.to_string(),
            full_path,
            parent: Some(parent),
            children: BTreeMap::new(),
        }
    }

    pub(crate) fn link_child(&mut self, name: &str, child: RegionId) {
        self.children.insert(name.to_string(), child);
    }

    /// This region's arena id.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The single path segment naming this region under its parent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical full path; the region's identity key.
    pub fn full_path(&self) -> &RegionPath {
        &self.full_path
    }

    /// The parent region's id. `None` only for the root.
    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    /// Child ids keyed by segment name.
    pub fn children(&self) -> &BTreeMap<String, RegionId> {
        &self.children
    }

    /// Look up a direct child by segment name.
    pub fn child(&self, name: &str) -> Option<RegionId> {
        self.children.get(name).copied()
    }

    /// Whether this is the synthetic root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Whether `candidate` equals `reference` or lies beneath it.
///
/// Only the two precomputed full paths are compared; the registry is not
/// consulted.
pub fn is_subregion(candidate: &Region, reference: &Region) -> bool {
    candidate.full_path().is_within(reference.full_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> RegionPath {
        RegionPath::parse(s)
    }

    #[test]
    fn root_has_no_segments() {
        let root = RegionPath::root();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.segments().count(), 0);
        assert_eq!(root.name(), "");
        assert!(root.parent().is_none());
    }

    #[test]
    fn segments_split_on_separator() {
        let p = path("India-Tamil Nadu-Keelakarai");
        let segments: Vec<&str> = p.segments().collect();
        assert_eq!(segments, vec!["India", "Tamil Nadu", "Keelakarai"]);
        assert_eq!(p.depth(), 3);
        assert_eq!(p.name(), "Keelakarai");
    }

    #[test]
    fn consecutive_separators_yield_empty_segment() {
        let p = path("India--Punch");
        let segments: Vec<&str> = p.segments().collect();
        assert_eq!(segments, vec!["India", "", "Punch"]);
    }

    #[test]
    fn parent_strips_last_segment() {
        assert_eq!(path("India-Kerala-Kochi").parent(), Some(path("India-Kerala")));
        assert_eq!(path("India").parent(), Some(RegionPath::root()));
    }

    #[test]
    fn from_segments_joins() {
        let p = RegionPath::from_segments(&["India", "Tamil Nadu", "Keelakarai"]).unwrap();
        assert_eq!(p.as_str(), "India-Tamil Nadu-Keelakarai");
        let empty: [&str; 0] = [];
        assert!(RegionPath::from_segments(&empty).unwrap().is_root());
    }

    #[test]
    fn from_segments_rejects_embedded_separator() {
        let err = RegionPath::from_segments(&["India", "Jammu-Kashmir"]).unwrap_err();
        assert_eq!(
            err,
            RegionError::EmbeddedSeparator {
                segment: "Jammu-Kashmir".to_string(),
                separator: '-',
            }
        );
    }

    #[test]
    fn subregion_prefix_law() {
        let abc = path("a-b-c");
        let ab = path("a-b");
        assert!(abc.is_within(&ab));
        assert!(!ab.is_within(&abc));
    }

    #[test]
    fn subregion_compares_whole_segments() {
        // "India-Tamil" is a string prefix of "India-Tamil Nadu" but not a segment prefix.
        assert!(!path("India-Tamil Nadu").is_within(&path("India-Tamil")));
        assert!(!path("Indiana").is_within(&path("India")));
    }

    #[test]
    fn root_contains_everything_but_nothing_contains_root() {
        assert!(path("India").is_within(&RegionPath::root()));
        assert!(RegionPath::root().is_within(&RegionPath::root()));
        assert!(!RegionPath::root().is_within(&path("India")));
    }

    #[test]
    fn is_subregion_uses_full_paths() {
        let india = Region::new(RegionId(1), "India", path("India"), RegionId::ROOT);
        let kerala = Region::new(RegionId(2), "Kerala", path("India-Kerala"), RegionId(1));
        assert!(is_subregion(&kerala, &india));
        assert!(!is_subregion(&india, &kerala));
        assert!(is_subregion(&india, &Region::root()));
    }

    #[test]
    fn region_path_serializes_as_string() {
        let p = path("India-Kerala");
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"India-Kerala\"");
    }
}
