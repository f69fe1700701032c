//! # Distributor Graph
//!
//! Owns every [`Distributor`] and every parent/child link between them. All
//! mutations go through the graph because a change to one distributor must
//! be followed by recomputation of every distributor downstream of it.
//!
//! ## Consistency Contract
//!
//! After any mutating call returns, the mutated distributor and its whole
//! descendant subgraph hold effective sets that are a pure function of their
//! current inputs. Propagation is inline and synchronous; there is no
//! observable intermediate state for a single-threaded caller.
//!
//! ## Propagation Order
//!
//! ```text
//!        A            A changes → affected = {B, C, D}
//!       / \           order     = B, C, D   (D after both of its parents)
//!      B   C
//!       \ /
//!        D
//! ```
//!
//! Descendants are recomputed exactly once each, in topological order, so a
//! distributor reachable through several paths never reads a parent that has
//! not been refreshed yet.
//!
//! ## Cycles
//!
//! [`DistributorGraph::add_parent`] refuses any link that would make a
//! distributor its own ancestor. The graph is therefore always acyclic and
//! the topological order always covers the full affected set.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use thiserror::Error;

use regauth_core::{AuthorizationError, DistributorId, Region, RegionPath};

use crate::distributor::{
    allowed_by_all_parents, compute_effective, compute_inherited_exclusions, Distributor,
};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by distributor graph operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No distributor is registered under the id.
    #[error("distributor not found: {0}")]
    UnknownDistributor(DistributorId),

    /// A distributor with the id already exists.
    #[error("distributor {0} already exists")]
    DuplicateDistributor(DistributorId),

    /// The parent gate refused a region grant.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The requested parent link would close a cycle.
    #[error("cannot make {parent} a parent of {child}: {child} is already an ancestor of {parent}")]
    CycleDetected {
        /// The prospective child.
        child: DistributorId,
        /// The prospective parent.
        parent: DistributorId,
    },
}

// ─── Graph ───────────────────────────────────────────────────────────

/// The set of all distributors, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DistributorGraph {
    distributors: BTreeMap<DistributorId, Distributor>,
}

impl DistributorGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a distributor with an initial set of authorized regions.
    ///
    /// The new distributor has no parents, so its effective set starts out
    /// equal to its authorized set.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateDistributor`] if the id is taken.
    pub fn create_distributor<'r>(
        &mut self,
        id: DistributorId,
        name: impl Into<String>,
        authorized: impl IntoIterator<Item = &'r Region>,
    ) -> Result<&Distributor, GraphError> {
        if self.distributors.contains_key(&id) {
            return Err(GraphError::DuplicateDistributor(id));
        }
        let authorized: BTreeSet<RegionPath> = authorized
            .into_iter()
            .map(|region| region.full_path().clone())
            .collect();
        tracing::info!(
            distributor = %id,
            regions = authorized.len(),
            "created distributor"
        );
        self.distributors
            .insert(id.clone(), Distributor::new(id.clone(), name.into(), authorized));
        self.recompute(&id);
        self.require(&id)
    }

    /// Grant `region` to a distributor.
    ///
    /// Fails closed: if any parent does not currently grant the region, the
    /// call is rejected and nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDistributor`] for an unknown id and
    /// [`GraphError::Authorization`] when the parent gate refuses.
    pub fn add_region(&mut self, id: &DistributorId, region: &Region) -> Result<(), GraphError> {
        let path = region.full_path();
        let distributor = self.require(id)?;
        if !allowed_by_all_parents(path, self.parents_of(distributor)) {
            tracing::warn!(distributor = %id, region = %path, "region denied by parent gate");
            return Err(AuthorizationError::Denied {
                distributor: id.to_string(),
                region: path.to_string(),
            }
            .into());
        }
        self.require_mut(id)?.authorized_mut().insert(path.clone());
        tracing::info!(distributor = %id, region = %path, "region added");
        self.refresh(id);
        Ok(())
    }

    /// Revoke a directly granted region. Never re-checks the parent gate.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDistributor`] for an unknown id.
    pub fn remove_region(&mut self, id: &DistributorId, region: &Region) -> Result<(), GraphError> {
        let path = region.full_path();
        self.require_mut(id)?.authorized_mut().remove(path);
        tracing::info!(distributor = %id, region = %path, "region removed");
        self.refresh(id);
        Ok(())
    }

    /// Add a standing veto on `region` and everything beneath it.
    ///
    /// Excluding a region that was never authorized is legal and suppresses
    /// later grants of it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDistributor`] for an unknown id.
    pub fn exclude_region(&mut self, id: &DistributorId, region: &Region) -> Result<(), GraphError> {
        let path = region.full_path();
        self.require_mut(id)?.excluded_mut().insert(path.clone());
        tracing::info!(distributor = %id, region = %path, "region excluded");
        self.refresh(id);
        Ok(())
    }

    /// Link `parent` as a parent of `child` and refresh `child`'s subgraph.
    ///
    /// `None` is a no-op. Linking an existing parent again is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDistributor`] if either id is unknown and
    /// [`GraphError::CycleDetected`] if `child` is `parent` or already an
    /// ancestor of it.
    pub fn add_parent(
        &mut self,
        child: &DistributorId,
        parent: Option<&DistributorId>,
    ) -> Result<(), GraphError> {
        let Some(parent) = parent else {
            return Ok(());
        };
        self.require(child)?;
        self.require(parent)?;

        if self.reaches(child, parent) {
            tracing::warn!(child = %child, parent = %parent, "parent link rejected: cycle");
            return Err(GraphError::CycleDetected {
                child: child.clone(),
                parent: parent.clone(),
            });
        }

        self.require_mut(child)?.parents_mut().insert(parent.clone());
        self.require_mut(parent)?.children_mut().insert(child.clone());
        tracing::info!(child = %child, parent = %parent, "parent linked");
        self.refresh(child);
        Ok(())
    }

    /// Whether a distributor may operate in `region` right now.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDistributor`] for an unknown id.
    pub fn has_permission(&self, id: &DistributorId, region: &Region) -> Result<bool, GraphError> {
        Ok(self.require(id)?.has_permission(region.full_path()))
    }

    /// Look up a distributor.
    pub fn get(&self, id: &DistributorId) -> Option<&Distributor> {
        self.distributors.get(id)
    }

    /// Whether a distributor is registered under `id`.
    pub fn contains(&self, id: &DistributorId) -> bool {
        self.distributors.contains_key(id)
    }

    /// All distributors, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Distributor> {
        self.distributors.values()
    }

    /// Number of distributors.
    pub fn len(&self) -> usize {
        self.distributors.len()
    }

    /// Whether the graph has no distributors.
    pub fn is_empty(&self) -> bool {
        self.distributors.is_empty()
    }

    /// Every distributor downstream of `id`, in the order propagation
    /// refreshes them. Excludes `id` itself.
    pub fn descendants(&self, id: &DistributorId) -> Vec<DistributorId> {
        let affected = self.reachable_from(id);
        self.topological_order(&affected)
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn require(&self, id: &DistributorId) -> Result<&Distributor, GraphError> {
        self.distributors
            .get(id)
            .ok_or_else(|| GraphError::UnknownDistributor(id.clone()))
    }

    fn require_mut(&mut self, id: &DistributorId) -> Result<&mut Distributor, GraphError> {
        self.distributors
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownDistributor(id.clone()))
    }

    fn parents_of<'a>(
        &'a self,
        distributor: &'a Distributor,
    ) -> impl Iterator<Item = &'a Distributor> + Clone + 'a {
        distributor
            .parents()
            .iter()
            .filter_map(move |pid| self.distributors.get(pid))
    }

    /// Recompute one distributor's inherited exclusions and effective set
    /// from its current inputs.
    fn recompute(&mut self, id: &DistributorId) {
        let Some(distributor) = self.distributors.get(id) else {
            return;
        };
        let inherited = compute_inherited_exclusions(self.parents_of(distributor));
        let effective = compute_effective(distributor, self.parents_of(distributor));
        if let Some(distributor) = self.distributors.get_mut(id) {
            distributor.set_inherited_exclusions(inherited);
            distributor.set_effective(effective);
        }
    }

    /// Recompute `origin`, then every descendant once in topological order.
    fn refresh(&mut self, origin: &DistributorId) {
        self.recompute(origin);
        let order = self.descendants(origin);
        for id in &order {
            tracing::debug!(origin = %origin, distributor = %id, "propagating effective regions");
            self.recompute(id);
        }
    }

    /// Whether `target` is reachable from `start` along child links.
    /// A distributor reaches itself.
    fn reaches(&self, start: &DistributorId, target: &DistributorId) -> bool {
        start == target || self.reachable_from(start).contains(target)
    }

    /// Distributors reachable from `start` along child links, excluding `start`.
    fn reachable_from(&self, start: &DistributorId) -> BTreeSet<DistributorId> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<&DistributorId> = self
            .distributors
            .get(start)
            .map(|d| d.children().iter().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if id == start || !visited.insert(id.clone()) {
                continue;
            }
            if let Some(d) = self.distributors.get(id) {
                stack.extend(d.children().iter());
            }
        }
        visited
    }

    /// Order `affected` so that every distributor follows all of its parents
    /// that are also in `affected`.
    fn topological_order(&self, affected: &BTreeSet<DistributorId>) -> Vec<DistributorId> {
        let mut pending: BTreeMap<&DistributorId, usize> = affected
            .iter()
            .map(|id| {
                let in_affected = self
                    .distributors
                    .get(id)
                    .map_or(0, |d| d.parents().iter().filter(|p| affected.contains(*p)).count());
                (id, in_affected)
            })
            .collect();

        let mut ready: VecDeque<&DistributorId> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(affected.len());

        while let Some(id) = ready.pop_front() {
            order.push(id.clone());
            let Some(distributor) = self.distributors.get(id) else {
                continue;
            };
            for child in distributor.children() {
                if let Some(count) = pending.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regauth_core::RegionRegistry;

    fn id(s: &str) -> DistributorId {
        DistributorId::new(s).unwrap()
    }

    fn registry() -> RegionRegistry {
        let mut registry = RegionRegistry::new();
        for path in [
            "India-Tamil Nadu-Keelakarai",
            "India-Tamil Nadu-Chennai",
            "India-Kerala-Kochi",
            "India-Punjab-Amritsar",
        ] {
            registry.add_region(path);
        }
        registry
    }

    fn region<'a>(registry: &'a RegionRegistry, path: &str) -> &'a Region {
        registry.get_region(path).unwrap()
    }

    #[test]
    fn create_seeds_effective_from_authorized() {
        let registry = registry();
        let mut graph = DistributorGraph::new();
        let d = graph
            .create_distributor(id("P"), "Parent", [region(&registry, "India")])
            .unwrap();
        assert_eq!(d.name(), "Parent");
        assert!(d.effective_regions().contains(&RegionPath::parse("India")));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut graph = DistributorGraph::new();
        graph.create_distributor(id("P"), "one", []).unwrap();
        let err = graph.create_distributor(id("P"), "two", []).unwrap_err();
        assert_eq!(err, GraphError::DuplicateDistributor(id("P")));
        assert_eq!(graph.get(&id("P")).unwrap().name(), "one");
    }

    #[test]
    fn unknown_distributor_is_reported() {
        let registry = registry();
        let mut graph = DistributorGraph::new();
        let india = region(&registry, "India");
        assert_eq!(
            graph.add_region(&id("X"), india).unwrap_err(),
            GraphError::UnknownDistributor(id("X"))
        );
        assert!(graph.has_permission(&id("X"), india).is_err());
    }

    #[test]
    fn add_parent_none_is_noop() {
        let mut graph = DistributorGraph::new();
        graph.create_distributor(id("C"), "child", []).unwrap();
        graph.add_parent(&id("C"), None).unwrap();
        assert!(graph.get(&id("C")).unwrap().parents().is_empty());
    }

    #[test]
    fn add_parent_links_both_directions() {
        let mut graph = DistributorGraph::new();
        graph.create_distributor(id("P"), "parent", []).unwrap();
        graph.create_distributor(id("C"), "child", []).unwrap();
        graph.add_parent(&id("C"), Some(&id("P"))).unwrap();
        graph.add_parent(&id("C"), Some(&id("P"))).unwrap();

        assert_eq!(graph.get(&id("C")).unwrap().parents(), &BTreeSet::from([id("P")]));
        assert_eq!(graph.get(&id("P")).unwrap().children(), &BTreeSet::from([id("C")]));
    }

    #[test]
    fn add_parent_filters_existing_grants() {
        let registry = registry();
        let mut graph = DistributorGraph::new();
        graph
            .create_distributor(id("P"), "parent", [region(&registry, "India-Kerala")])
            .unwrap();
        graph
            .create_distributor(
                id("C"),
                "child",
                [
                    region(&registry, "India-Kerala-Kochi"),
                    region(&registry, "India-Punjab"),
                ],
            )
            .unwrap();

        graph.add_parent(&id("C"), Some(&id("P"))).unwrap();

        let child = graph.get(&id("C")).unwrap();
        assert_eq!(child.authorized_regions().len(), 2);
        assert_eq!(
            child.effective_regions(),
            &BTreeSet::from([RegionPath::parse("India-Kerala-Kochi")])
        );
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let mut graph = DistributorGraph::new();
        graph.create_distributor(id("A"), "a", []).unwrap();
        let err = graph.add_parent(&id("A"), Some(&id("A"))).unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
        assert!(graph.get(&id("A")).unwrap().parents().is_empty());
    }

    #[test]
    fn cycle_through_ancestors_is_rejected() {
        let mut graph = DistributorGraph::new();
        for name in ["A", "B", "C"] {
            graph.create_distributor(id(name), name, []).unwrap();
        }
        graph.add_parent(&id("B"), Some(&id("A"))).unwrap();
        graph.add_parent(&id("C"), Some(&id("B"))).unwrap();

        let err = graph.add_parent(&id("A"), Some(&id("C"))).unwrap_err();
        assert_eq!(
            err,
            GraphError::CycleDetected {
                child: id("A"),
                parent: id("C"),
            }
        );
        assert!(graph.get(&id("A")).unwrap().parents().is_empty());
        assert!(graph.get(&id("C")).unwrap().children().is_empty());
    }

    #[test]
    fn descendants_follow_topological_order() {
        let mut graph = DistributorGraph::new();
        for name in ["A", "B", "C", "D"] {
            graph.create_distributor(id(name), name, []).unwrap();
        }
        graph.add_parent(&id("B"), Some(&id("A"))).unwrap();
        graph.add_parent(&id("C"), Some(&id("A"))).unwrap();
        graph.add_parent(&id("D"), Some(&id("B"))).unwrap();
        graph.add_parent(&id("D"), Some(&id("C"))).unwrap();
        graph.add_parent(&id("C"), Some(&id("B"))).unwrap();

        let order = graph.descendants(&id("A"));
        assert_eq!(order, vec![id("B"), id("C"), id("D")]);
        assert!(graph.descendants(&id("D")).is_empty());
    }

    #[test]
    fn remove_region_ignores_unknown_path() {
        let registry = registry();
        let mut graph = DistributorGraph::new();
        graph
            .create_distributor(id("P"), "parent", [region(&registry, "India")])
            .unwrap();
        graph
            .remove_region(&id("P"), region(&registry, "India-Kerala"))
            .unwrap();
        assert!(graph
            .has_permission(&id("P"), region(&registry, "India-Kerala-Kochi"))
            .unwrap());
    }
}
