use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use waygraph::prelude::*;

fn located_nodes(ds: &DataSet, n: usize) -> Vec<NodeRef> {
    (0..n)
        .map(|i| {
            let node = Node::new(Some(LatLon::new(i as f64 * 0.001, 0.0)));
            ds.add_node(node.clone()).expect("add node");
            node
        })
        .collect()
}

fn bound_way(ds: &Arc<DataSet>, nodes: &[NodeRef]) -> Arc<Way> {
    let way = Arc::new(Way::new());
    way.set_nodes(nodes.iter().cloned()).expect("set nodes");
    ds.add_way(Arc::clone(&way)).expect("add way");
    way
}

#[test]
fn ways_sharing_a_node_edit_in_parallel() {
    let ds = DataSet::new();
    let nodes = located_nodes(&ds, 9);
    let shared = nodes[0].clone();
    let a = bound_way(&ds, &[shared.clone(), nodes[1].clone()]);
    let b = bound_way(&ds, &[shared.clone(), nodes[5].clone()]);

    std::thread::scope(|s| {
        for (way, extra) in [(&a, &nodes[2..5]), (&b, &nodes[6..9])] {
            s.spawn(move || {
                for _ in 0..50 {
                    for n in extra {
                        way.add_node(n).expect("add");
                    }
                    for n in extra {
                        way.remove_node(n).expect("remove");
                    }
                }
            });
        }
    });

    assert_eq!(a.nodes_count(), 2);
    assert_eq!(b.nodes_count(), 2);
    assert_eq!(shared.referrers().len(), 2);
    a.validate_invariants().expect("a consistent");
    b.validate_invariants().expect("b consistent");
}

#[test]
fn one_way_many_writers_stays_consistent() {
    let ds = DataSet::new();
    let nodes = located_nodes(&ds, 8);
    let way = bound_way(&ds, &nodes[..2]);

    std::thread::scope(|s| {
        for chunk in nodes[2..].chunks(2) {
            let way = &way;
            s.spawn(move || {
                for n in chunk {
                    way.add_node(n).expect("add");
                }
            });
        }
    });

    assert_eq!(way.nodes_count(), 8);
    assert!(nodes.iter().all(|n| way.contains_node(n)));
    way.validate_invariants().expect("consistent");
}

struct Retagger {
    way: OnceCell<Arc<Way>>,
    seen: Mutex<Vec<DataSetEvent>>,
    calls: AtomicUsize,
}

impl DataSetListener for Retagger {
    fn on_event(&self, event: &DataSetEvent) {
        self.seen.lock().push(event.clone());
        if let (DataSetEvent::WayNodesChanged(_), Some(way)) = (event, self.way.get()) {
            let count = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
            // Runs under the way's write lock on this thread.
            way.put_tag("edits", &count.to_string()).expect("reentrant tag");
            assert!(way.bbox().is_valid());
        }
    }
}

#[test]
fn listeners_may_reenter_the_editing_way() {
    let ds = DataSet::new();
    let nodes = located_nodes(&ds, 3);
    let listener = Arc::new(Retagger {
        way: OnceCell::new(),
        seen: Mutex::new(Vec::new()),
        calls: AtomicUsize::new(0),
    });
    ds.add_listener(listener.clone());

    let way = bound_way(&ds, &nodes[..1]);
    listener.way.set(Arc::clone(&way)).expect("set once");
    way.add_node(&nodes[1]).expect("add");
    way.add_node(&nodes[2]).expect("add");

    assert_eq!(way.tag("edits").as_deref(), Some("2"));
    let seen = listener.seen.lock();
    assert_eq!(
        seen.last(),
        Some(&DataSetEvent::WayNodesChanged(way.id()))
    );
    assert!(seen.contains(&DataSetEvent::PrimitivesAdded(vec![(
        PrimitiveType::Way,
        way.id()
    )])));
}
