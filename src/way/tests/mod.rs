mod mutation_tests;

use std::sync::Arc;

use super::Way;
use crate::dataset::DataSet;
use crate::geometry::LatLon;
use crate::node::{Node, NodeRef};

fn node_at(lat: f64, lon: f64) -> NodeRef {
    Node::new(Some(LatLon::new(lat, lon)))
}

/// `n` located nodes on a diagonal, not bound to any dataset.
fn loose_nodes(n: usize) -> Vec<NodeRef> {
    (0..n).map(|i| node_at(i as f64, i as f64)).collect()
}

/// `n` located nodes added to `ds`.
fn dataset_nodes(ds: &DataSet, n: usize) -> Vec<NodeRef> {
    let nodes = loose_nodes(n);
    for node in &nodes {
        ds.add_node(node.clone()).unwrap();
    }
    nodes
}

fn loose_way(nodes: &[NodeRef]) -> Way {
    let way = Way::new();
    way.set_nodes(nodes.iter().cloned()).unwrap();
    way
}

fn bound_way(ds: &Arc<DataSet>, nodes: &[NodeRef]) -> Arc<Way> {
    let way = Arc::new(loose_way(nodes));
    ds.add_way(Arc::clone(&way)).unwrap();
    way
}

fn refers_to(node: &NodeRef, way: &Way) -> bool {
    node.has_referrer(&way.as_referrer())
}
