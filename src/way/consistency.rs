//! Integrity checks for way node lists.
//!
//! [`check_nodes`] guards every edit before it is published: nodes of a
//! bound way must live in the same dataset, must not be deleted, and (when
//! the dataset enables it) complete visible nodes must have coordinates.
//! Unbound ways are not checked.
//!
//! After publishing, [`Way::validate_referrers`] re-checks the back-links of
//! the nodes the edit touched. [`DebugInvariants`] is the full audit: it
//! re-runs the membership rules and scans the whole dataset for stale links.

use std::sync::Arc;

use super::Way;
use crate::dataset::DataSet;
use crate::debug_invariants::DebugInvariants;
use crate::graph_error::{GraphError, IntegrityKind, IntegrityViolation};
use crate::node::{NodeRef, NodeSet};

/// Validate a candidate node list for `way` against `dataset`.
pub(crate) fn check_nodes(
    way: &Way,
    dataset: Option<&Arc<DataSet>>,
    nodes: &[NodeRef],
) -> Result<(), GraphError> {
    let Some(ds) = dataset else {
        return Ok(());
    };
    let fail = |kind: IntegrityKind, node: &NodeRef| {
        let v = IntegrityViolation::new(kind, way.id(), Some(node.id()));
        log::warn!("rejecting node list: {v}");
        Err(GraphError::DataIntegrity(v))
    };
    for n in nodes {
        if n.dataset_id() != Some(ds.id()) {
            return fail(IntegrityKind::ForeignDataSet, n);
        }
        if n.is_deleted() {
            return fail(IntegrityKind::DeletedNode, n);
        }
    }
    if ds.config().check_null_coordinates {
        if let Some(n) = nodes
            .iter()
            .find(|n| n.is_visible() && !n.is_incomplete() && !n.is_lat_lon_known())
        {
            return fail(IntegrityKind::NullCoordinates, n);
        }
    }
    Ok(())
}

fn referrer_violation(way: &Way, kind: IntegrityKind, node: &NodeRef) -> GraphError {
    IntegrityViolation::new(kind, way.id(), Some(node.id())).into()
}

impl Way {
    /// Back-link check after an edit that replaced `previous`.
    ///
    /// Only nodes of the old and the new list can have changed, so only those
    /// are visited. Membership rules were enforced before publishing and are
    /// not repeated; a node deleted since then is the next edit's concern.
    pub(crate) fn validate_referrers(&self, previous: &[NodeRef]) -> Result<(), GraphError> {
        if self.is_deleted() {
            return Ok(());
        }
        let me = self.as_referrer();
        let nodes = self.nodes();
        if let Some(n) = nodes.iter().find(|n| !n.has_referrer(&me)) {
            return Err(referrer_violation(self, IntegrityKind::MissingReferrer, n));
        }
        let current: NodeSet = nodes.iter().cloned().collect();
        if let Some(n) = previous
            .iter()
            .find(|n| !current.contains(*n) && n.has_referrer(&me))
        {
            return Err(referrer_violation(self, IntegrityKind::StaleReferrer, n));
        }
        Ok(())
    }
}

impl DebugInvariants for Way {
    fn validate_invariants(&self) -> Result<(), GraphError> {
        // A deleted way has dropped out of every referrer set on purpose.
        if self.is_deleted() {
            return Ok(());
        }
        let nodes = self.nodes();
        let dataset = self.dataset();
        check_nodes(self, dataset.as_ref(), &nodes)?;

        let me = self.as_referrer();
        if let Some(n) = nodes.iter().find(|n| !n.has_referrer(&me)) {
            return Err(referrer_violation(self, IntegrityKind::MissingReferrer, n));
        }
        if let Some(ds) = dataset {
            if let Some(stale) = ds
                .nodes()
                .into_iter()
                .find(|n| n.has_referrer(&me) && !nodes.contains(n))
            {
                return Err(referrer_violation(self, IntegrityKind::StaleReferrer, &stale));
            }
        }
        Ok(())
    }
}
