//! Topology queries: closure, area, endpoints, neighbours and segments.
//!
//! All queries read one node list snapshot and compare nodes by identity.

use itertools::Itertools;

use super::Way;
use crate::node::{NodeRef, NodeSet};
use crate::primitive::{Oneway, PrimitiveType};

/// Closure test on one node list snapshot.
fn closed(nodes: &[NodeRef]) -> bool {
    nodes.len() >= 3 && nodes.first() == nodes.last()
}

impl Way {
    /// [`closed`] on `nodes`, unless the way is incomplete.
    ///
    /// Queries pass the snapshot they already hold so the closure decision
    /// and the scan see the same list.
    pub(super) fn is_closed_in(&self, nodes: &[NodeRef]) -> bool {
        !self.is_incomplete() && closed(nodes)
    }

    /// First and last node are the same instance, with at least three nodes.
    ///
    /// Always `false` for an incomplete way.
    pub fn is_closed(&self) -> bool {
        self.is_closed_in(&self.nodes())
    }

    /// Closed, with at least two distinct nodes besides the closing one.
    ///
    /// `[A, B, A, A]` is closed but only back-and-forth, so not an area.
    pub fn is_area(&self) -> bool {
        let nodes = self.nodes();
        if nodes.len() < 4 || !self.is_closed_in(&nodes) {
            return false;
        }
        let closing = &nodes[0];
        let mut distinct: Option<&NodeRef> = None;
        for n in &nodes[1..nodes.len() - 1] {
            if n == closing {
                continue;
            }
            match distinct {
                None => distinct = Some(n),
                Some(d) if d != n => return true,
                Some(_) => {}
            }
        }
        false
    }

    pub fn display_type(&self) -> PrimitiveType {
        if self.is_closed() {
            PrimitiveType::ClosedWay
        } else {
            PrimitiveType::Way
        }
    }

    pub fn first_node(&self) -> Option<NodeRef> {
        if self.is_incomplete() {
            return None;
        }
        self.nodes().first().cloned()
    }

    pub fn last_node(&self) -> Option<NodeRef> {
        if self.is_incomplete() {
            return None;
        }
        self.nodes().last().cloned()
    }

    /// Direction from the `oneway` tag.
    pub fn is_oneway(&self) -> Oneway {
        Oneway::from_tag(self.tag("oneway").as_deref())
    }

    /// First node in travel direction when `respect_oneway` is set, i.e. the
    /// last node of a reversed oneway.
    pub fn first_node_respecting(&self, respect_oneway: bool) -> Option<NodeRef> {
        if respect_oneway && self.is_oneway() == Oneway::Reversed {
            self.last_node()
        } else {
            self.first_node()
        }
    }

    /// Counterpart of [`Way::first_node_respecting`].
    pub fn last_node_respecting(&self, respect_oneway: bool) -> Option<NodeRef> {
        if respect_oneway && self.is_oneway() == Oneway::Reversed {
            self.first_node()
        } else {
            self.last_node()
        }
    }

    pub fn is_first_last_node(&self, node: &NodeRef) -> bool {
        if self.is_incomplete() {
            return false;
        }
        let nodes = self.nodes();
        nodes.first() == Some(node) || nodes.last() == Some(node)
    }

    /// `node` sits strictly between the endpoints.
    ///
    /// On a closed way the closing node counts as inner too.
    pub fn is_inner_node(&self, node: &NodeRef) -> bool {
        let nodes = self.nodes();
        if self.is_incomplete() || nodes.len() <= 2 {
            return false;
        }
        let last = nodes.len() - 1;
        if nodes[0] == *node && nodes[last] == *node {
            return true;
        }
        nodes[1..last].contains(node)
    }

    /// Nodes adjacent to any occurrence of `node`.
    pub fn neighbours(&self, node: &NodeRef) -> NodeSet {
        let nodes = self.nodes();
        let mut out = NodeSet::new();
        for (i, n) in nodes.iter().enumerate() {
            if n != node {
                continue;
            }
            if i > 0 {
                out.insert(nodes[i - 1].clone());
            }
            if let Some(next) = nodes.get(i + 1) {
                out.insert(next.clone());
            }
        }
        out
    }

    /// Consecutive node pairs, one per segment.
    ///
    /// With `sort`, each pair is put in canonical node order so a segment
    /// compares equal whichever direction it is traversed in.
    pub fn node_pairs(&self, sort: bool) -> Vec<(NodeRef, NodeRef)> {
        if self.is_incomplete() {
            return Vec::new();
        }
        self.nodes()
            .iter()
            .cloned()
            .tuple_windows()
            .map(|(a, b)| if sort && b < a { (b, a) } else { (a, b) })
            .collect()
    }
}
