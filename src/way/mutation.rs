//! Node list edits.
//!
//! Every public mutator checks the dataset's read-only mode, takes the way's
//! write lock, builds the complete candidate list, validates it and only then
//! publishes it. Referrer sets and style caches of every node whose
//! membership changed are updated in the same critical section.

use std::sync::Arc;

use super::{Way, consistency};
use crate::graph_error::GraphError;
use crate::node::{NodeRef, NodeSet};
use crate::primitive::InvalidateCache;

/// Drops a node that directly repeats its predecessor.
///
/// Never shortens the list below two entries, so a removal cannot leave a
/// zero-length segment but also cannot collapse a way to a single node.
pub fn remove_double<T: PartialEq>(nodes: &mut Vec<T>) {
    let mut i = 1;
    while i < nodes.len() && nodes.len() > 2 {
        if nodes[i] == nodes[i - 1] {
            nodes.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Restores or drops the closing node after a removal.
///
/// A way that was closed through a removed node gets re-closed on its new
/// first node if more than two nodes are left. Otherwise a two- or
/// three-node remainder whose ends coincide loses its trailing duplicate.
fn repair_closure(nodes: &mut Vec<NodeRef>, was_closed: bool) {
    let n = nodes.len();
    if was_closed && n > 2 {
        let first = nodes[0].clone();
        nodes.push(first);
    } else if (2..=3).contains(&n) && nodes[0] == nodes[n - 1] {
        nodes.pop();
    }
}

impl Way {
    /// Replaces the node list.
    ///
    /// Old nodes lose this way as referrer, new nodes gain it, styles of all
    /// of them are invalidated and the dataset is notified.
    ///
    /// # Errors
    /// `ReadOnlyViolation` if the dataset is read-only; `DataIntegrity` if the
    /// new list breaks a dataset invariant, in which case nothing changes.
    pub fn set_nodes<I>(&self, nodes: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = NodeRef>,
    {
        self.check_dataset_not_read_only()?;
        let _guard = self.write_lock();
        self.set_nodes_locked(nodes.into_iter().collect())
    }

    /// Core of [`Way::set_nodes`]; the caller holds the write lock.
    pub(crate) fn set_nodes_locked(&self, nodes: Vec<NodeRef>) -> Result<(), GraphError> {
        consistency::check_nodes(self, self.dataset().as_ref(), &nodes)?;
        self.publish_nodes_locked(nodes);
        Ok(())
    }

    /// Swaps in an already validated list and moves the back-references.
    ///
    /// Cannot fail, so callers may change other state first and still publish
    /// all of it together. A deleted way stays out of referrer sets.
    pub(crate) fn publish_nodes_locked(&self, nodes: Vec<NodeRef>) {
        let me = self.as_referrer();
        let new = Arc::new(nodes);
        let old = self.nodes.swap(Arc::clone(&new));
        for n in old.iter() {
            n.remove_referrer(&me);
            n.clear_cached_style();
        }
        let deleted = self.is_deleted();
        for n in new.iter() {
            if !deleted {
                n.add_referrer(me);
            }
            n.clear_cached_style();
        }
        self.nodes_changed(&old);
    }

    /// Appends `node`.
    ///
    /// # Errors
    /// `IncompleteWay` if the node list has not been loaded.
    pub fn add_node(&self, node: &NodeRef) -> Result<(), GraphError> {
        let _guard = self.write_lock();
        let len = self.nodes_count();
        self.insert_node_locked(len, node)
    }

    /// Inserts `node` before position `offset` (`offset == len` appends).
    ///
    /// # Errors
    /// `IncompleteWay` if the node list has not been loaded,
    /// `IndexOutOfRange` if `offset > len`.
    pub fn add_node_at(&self, offset: usize, node: &NodeRef) -> Result<(), GraphError> {
        let _guard = self.write_lock();
        self.insert_node_locked(offset, node)
    }

    fn insert_node_locked(&self, offset: usize, node: &NodeRef) -> Result<(), GraphError> {
        self.check_dataset_not_read_only()?;
        if self.is_incomplete() {
            return Err(GraphError::IncompleteWay {
                way: self.id,
                node: node.id(),
            });
        }
        let current = self.nodes();
        if offset > current.len() {
            return Err(GraphError::IndexOutOfRange {
                offset,
                len: current.len(),
            });
        }
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend_from_slice(&current[..offset]);
        next.push(node.clone());
        next.extend_from_slice(&current[offset..]);
        consistency::check_nodes(self, self.dataset().as_ref(), &next)?;

        self.style.invalidate_cache();
        if !self.is_deleted() {
            node.add_referrer(self.as_referrer());
        }
        self.nodes.store(Arc::new(next));
        node.clear_cached_style();
        self.nodes_changed(&current);
        Ok(())
    }

    /// Removes every occurrence of `node`, repairing closure and collapsing
    /// repeated neighbours. Does nothing on an incomplete way.
    pub fn remove_node(&self, node: &NodeRef) -> Result<(), GraphError> {
        self.check_dataset_not_read_only()?;
        if self.is_incomplete() {
            return Ok(());
        }
        let _guard = self.write_lock();
        let current = self.nodes();
        let was_closed = current.first() == Some(node) && current.last() == Some(node);
        let mut copy: Vec<NodeRef> = current.iter().filter(|n| *n != node).cloned().collect();
        repair_closure(&mut copy, was_closed);
        remove_double(&mut copy);
        self.set_nodes_locked(copy)?;
        node.clear_cached_style();
        Ok(())
    }

    /// Removes every node in `selection` with the same repair rules as
    /// [`Way::remove_node`]. Does nothing on an incomplete way.
    pub fn remove_nodes(&self, selection: &NodeSet) -> Result<(), GraphError> {
        self.check_dataset_not_read_only()?;
        if self.is_incomplete() {
            return Ok(());
        }
        let _guard = self.write_lock();
        self.set_nodes_locked(self.calculate_remove_nodes(selection))?;
        for n in selection {
            n.clear_cached_style();
        }
        Ok(())
    }

    /// The node list [`Way::remove_nodes`] would produce, without changing
    /// anything. Returns the current list for an incomplete way.
    pub fn calculate_remove_nodes(&self, selection: &NodeSet) -> Vec<NodeRef> {
        let current = self.nodes();
        if self.is_incomplete() {
            return current.to_vec();
        }
        let was_closed = self.is_closed_in(&current)
            && current.last().is_some_and(|last| selection.contains(last));
        let mut copy: Vec<NodeRef> = current
            .iter()
            .filter(|n| !selection.contains(*n))
            .cloned()
            .collect();
        repair_closure(&mut copy, was_closed);
        remove_double(&mut copy);
        copy
    }

    /// Marks the way deleted (dropping it from every node's referrer set) or
    /// restores it.
    ///
    /// The node list stays readable while deleted. Undeleting validates the
    /// list against the dataset first.
    pub fn set_deleted(&self, deleted: bool) -> Result<(), GraphError> {
        self.check_dataset_not_read_only()?;
        let _guard = self.write_lock();
        let nodes = self.nodes();
        if !deleted {
            consistency::check_nodes(self, self.dataset().as_ref(), &nodes)?;
        }
        let me = self.as_referrer();
        for n in nodes.iter() {
            if deleted {
                n.remove_referrer(&me);
            } else {
                n.add_referrer(me);
            }
            n.clear_cached_style();
        }
        self.flags.set_deleted(deleted);
        self.nodes_changed(&nodes);
        Ok(())
    }

    /// Post-publish bookkeeping shared by every structural edit.
    ///
    /// `previous` is the list the edit replaced.
    fn nodes_changed(&self, previous: &[NodeRef]) {
        self.invalidate_geometry();
        self.style.invalidate_cache();
        log::debug!(
            "way {}: node list changed ({} -> {} nodes)",
            self.id,
            previous.len(),
            self.nodes_count()
        );
        crate::debug_invariants!(self.validate_referrers(previous), "way node list");
        if let Some(ds) = self.dataset() {
            ds.fire_way_nodes_changed(self);
        }
    }
}
