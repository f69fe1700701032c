//! # Distributor
//!
//! A distributor is a principal that may operate in a set of regions. Its
//! permission is shaped by three inputs:
//!
//! - **authorized** regions it was granted directly,
//! - **excluded** regions that veto themselves and everything beneath them,
//! - the **effective** regions and exclusions of every parent distributor.
//!
//! The derived `effective` set is what the distributor may actually use. It
//! is recomputed by the [`DistributorGraph`](crate::DistributorGraph) after
//! every mutation, so a `Distributor` only exposes read accessors here.
//!
//! ## Gate Semantics
//!
//! ```text
//! inherited         =  ⋃ parent: parent.excluded ∪ parent.inherited
//! vetoed r          ⇔  r ⊆ some (excluded ∪ inherited)
//! parent grants r   ⇔  ¬ parent vetoes r  ∧  r ⊆ some parent.effective
//! parents allow r   ⇔  ∀ parent: parent grants r          (joint custody)
//! effective         =  { r ∈ authorized : parents allow r } ∖ excluded
//! has_permission(r) ⇔  ¬ vetoed r  ∧  r ⊆ some effective
//! ```
//!
//! `⊆` is [`RegionPath::is_within`]. The final set difference is keyed on
//! exact path; subregions of an excluded path are filtered at query time.
//! An ancestor's exclusion therefore reaches every descendant even when it
//! sits beneath a region the descendant holds.

use std::collections::BTreeSet;

use serde::Serialize;

use regauth_core::{DistributorId, RegionPath};

/// A distributor principal and its derived authorization state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distributor {
    id: DistributorId,
    name: String,
    authorized: BTreeSet<RegionPath>,
    excluded: BTreeSet<RegionPath>,
    inherited_excluded: BTreeSet<RegionPath>,
    effective: BTreeSet<RegionPath>,
    parents: BTreeSet<DistributorId>,
    children: BTreeSet<DistributorId>,
}

impl Distributor {
    pub(crate) fn new(id: DistributorId, name: String, authorized: BTreeSet<RegionPath>) -> Self {
        Self {
            id,
            name,
            authorized,
            excluded: BTreeSet::new(),
            inherited_excluded: BTreeSet::new(),
            effective: BTreeSet::new(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> &DistributorId {
        &self.id
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regions granted directly to this distributor.
    pub fn authorized_regions(&self) -> &BTreeSet<RegionPath> {
        &self.authorized
    }

    /// Regions this distributor has vetoed.
    pub fn excluded_regions(&self) -> &BTreeSet<RegionPath> {
        &self.excluded
    }

    /// Exclusions held by any ancestor. They veto this distributor exactly
    /// as its own exclusions do.
    pub fn inherited_exclusions(&self) -> &BTreeSet<RegionPath> {
        &self.inherited_excluded
    }

    /// Regions this distributor may currently operate in.
    pub fn effective_regions(&self) -> &BTreeSet<RegionPath> {
        &self.effective
    }

    /// Ids of the distributors whose authorization gates this one.
    pub fn parents(&self) -> &BTreeSet<DistributorId> {
        &self.parents
    }

    /// Ids of the distributors gated by this one.
    pub fn children(&self) -> &BTreeSet<DistributorId> {
        &self.children
    }

    /// Whether `region` lies within a region excluded here or by an ancestor.
    pub fn is_excluded(&self, region: &RegionPath) -> bool {
        self.excluded
            .iter()
            .chain(&self.inherited_excluded)
            .any(|ex| region.is_within(ex))
    }

    /// Whether this distributor may operate in `region` right now.
    ///
    /// Exclusion is checked against the excluded set directly rather than
    /// relying on the cached effective set alone.
    pub fn has_permission(&self, region: &RegionPath) -> bool {
        if self.is_excluded(region) {
            return false;
        }
        self.effective.iter().any(|er| region.is_within(er))
    }

    /// Whether this distributor, acting as a parent, passes `candidate`
    /// down to its children. Identical to [`has_permission`](Self::has_permission).
    pub fn grants(&self, candidate: &RegionPath) -> bool {
        self.has_permission(candidate)
    }

    pub(crate) fn authorized_mut(&mut self) -> &mut BTreeSet<RegionPath> {
        &mut self.authorized
    }

    pub(crate) fn excluded_mut(&mut self) -> &mut BTreeSet<RegionPath> {
        &mut self.excluded
    }

    pub(crate) fn parents_mut(&mut self) -> &mut BTreeSet<DistributorId> {
        &mut self.parents
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeSet<DistributorId> {
        &mut self.children
    }

    pub(crate) fn set_effective(&mut self, effective: BTreeSet<RegionPath>) {
        self.effective = effective;
    }

    pub(crate) fn set_inherited_exclusions(&mut self, inherited: BTreeSet<RegionPath>) {
        self.inherited_excluded = inherited;
    }
}

/// Whether every parent independently grants `candidate`.
///
/// A parent vetoes the candidate if it lies within one of the parent's own
/// or inherited excluded regions, and otherwise requires it to lie within at least one of
/// the parent's effective regions. An empty parent set allows everything.
pub fn allowed_by_all_parents<'a>(
    candidate: &RegionPath,
    parents: impl IntoIterator<Item = &'a Distributor>,
) -> bool {
    parents.into_iter().all(|parent| parent.grants(candidate))
}

/// Union of every parent's own and inherited exclusions.
pub(crate) fn compute_inherited_exclusions<'a>(
    parents: impl IntoIterator<Item = &'a Distributor>,
) -> BTreeSet<RegionPath> {
    parents
        .into_iter()
        .flat_map(|parent| parent.excluded.iter().chain(&parent.inherited_excluded))
        .cloned()
        .collect()
}

/// Compute the effective set from authorized regions, the parent gate, and
/// exclusions.
pub(crate) fn compute_effective<'a>(
    distributor: &Distributor,
    parents: impl IntoIterator<Item = &'a Distributor> + Clone,
) -> BTreeSet<RegionPath> {
    distributor
        .authorized
        .iter()
        .filter(|region| allowed_by_all_parents(region, parents.clone()))
        .filter(|region| !distributor.excluded.contains(*region))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> RegionPath {
        RegionPath::parse(s)
    }

    fn distributor(id: &str, authorized: &[&str]) -> Distributor {
        let mut d = Distributor::new(
            DistributorId::new(id).unwrap(),
            id.to_lowercase(),
            authorized.iter().map(|p| path(p)).collect(),
        );
        let effective = compute_effective(&d, std::iter::empty());
        d.set_effective(effective);
        d
    }

    #[test]
    fn root_distributor_effective_equals_authorized() {
        let d = distributor("P", &["India", "Nepal-Bagmati"]);
        assert_eq!(d.effective_regions(), d.authorized_regions());
    }

    #[test]
    fn has_permission_covers_subregions() {
        let d = distributor("P", &["India-Tamil Nadu"]);
        assert!(d.has_permission(&path("India-Tamil Nadu")));
        assert!(d.has_permission(&path("India-Tamil Nadu-Keelakarai")));
        assert!(!d.has_permission(&path("India")));
        assert!(!d.has_permission(&path("India-Kerala")));
    }

    #[test]
    fn exclusion_vetoes_subtree_at_query_time() {
        let mut d = distributor("P", &["India"]);
        d.excluded_mut().insert(path("India-Kerala"));
        assert!(d.has_permission(&path("India-Punjab")));
        assert!(!d.has_permission(&path("India-Kerala")));
        assert!(!d.has_permission(&path("India-Kerala-Kochi")));
    }

    #[test]
    fn exact_exclusion_is_removed_from_effective() {
        let mut d = distributor("P", &["India", "Nepal"]);
        d.excluded_mut().insert(path("Nepal"));
        let effective = compute_effective(&d, std::iter::empty());
        assert_eq!(effective, BTreeSet::from([path("India")]));
    }

    #[test]
    fn no_parents_allows_everything() {
        assert!(allowed_by_all_parents(&path("Anywhere"), std::iter::empty()));
    }

    #[test]
    fn parent_gate_is_a_conjunction() {
        let p1 = distributor("P1", &["India"]);
        let p2 = distributor("P2", &["India-Kerala"]);
        assert!(allowed_by_all_parents(&path("India-Kerala-Kochi"), [&p1, &p2]));
        assert!(!allowed_by_all_parents(&path("India-Punjab"), [&p1, &p2]));
    }

    #[test]
    fn parent_exclusion_dominates_parent_grant() {
        let mut p = distributor("P", &["India"]);
        p.excluded_mut().insert(path("India-Kerala"));
        assert!(!allowed_by_all_parents(&path("India-Kerala-Kochi"), [&p]));
        assert!(allowed_by_all_parents(&path("India-Goa"), [&p]));
    }

    #[test]
    fn child_effective_is_filtered_by_parent() {
        let parent = distributor("P", &["India-Kerala"]);
        let child = Distributor::new(
            DistributorId::new("C").unwrap(),
            "c".to_string(),
            [path("India-Kerala-Kochi"), path("India-Goa")].into(),
        );
        let effective = compute_effective(&child, [&parent]);
        assert_eq!(effective, BTreeSet::from([path("India-Kerala-Kochi")]));
    }

    #[test]
    fn inherited_exclusions_union_both_parent_sets() {
        let mut p1 = distributor("P1", &["India"]);
        p1.excluded_mut().insert(path("India-Kerala"));
        let mut p2 = distributor("P2", &["India"]);
        p2.set_inherited_exclusions([path("India-Goa")].into());

        let inherited = compute_inherited_exclusions([&p1, &p2]);
        assert_eq!(inherited, BTreeSet::from([path("India-Goa"), path("India-Kerala")]));
    }

    #[test]
    fn inherited_exclusion_vetoes_beneath_held_region() {
        let mut d = distributor("C", &["India-Tamil Nadu"]);
        d.set_inherited_exclusions([path("India-Tamil Nadu-Keelakarai")].into());
        assert!(d.has_permission(&path("India-Tamil Nadu-Chennai")));
        assert!(!d.has_permission(&path("India-Tamil Nadu-Keelakarai")));
        assert!(!d.grants(&path("India-Tamil Nadu-Keelakarai")));
        assert!(d.excluded_regions().is_empty());
    }

    #[test]
    fn serializes_derived_sets() {
        let mut d = distributor("P", &["India"]);
        d.set_inherited_exclusions([path("India-Goa")].into());
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["id"], "P");
        assert_eq!(value["effective"][0], "India");
        assert_eq!(value["inherited_excluded"][0], "India-Goa");
    }
}
