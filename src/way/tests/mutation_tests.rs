use proptest::prelude::*;

use super::*;
use crate::graph_error::{GraphError, IntegrityKind};
use crate::node::NodeSet;
use crate::primitive::{Primitive, PrimitiveData, PrimitiveId, PrimitiveType, WayData};
use crate::way::remove_double;

#[test]
fn set_nodes_moves_referrers() {
    let n = loose_nodes(3);
    let way = loose_way(&n[..2]);
    assert!(refers_to(&n[0], &way) && refers_to(&n[1], &way));

    way.set_nodes([n[1].clone(), n[2].clone()]).unwrap();
    assert!(!refers_to(&n[0], &way));
    assert!(refers_to(&n[1], &way));
    assert!(refers_to(&n[2], &way));
    assert_eq!(way.nodes_count(), 2);
}

#[test]
fn set_nodes_invalidates_styles() {
    let n = loose_nodes(2);
    let way = loose_way(&n[..1]);
    n[0].style_cache().mark_cached();
    way.style_cache().mark_cached();
    way.set_nodes([n[1].clone()]).unwrap();
    assert!(!n[0].style_cache().is_cached());
    assert!(!way.style_cache().is_cached());
}

#[test]
fn add_node_appends_and_inserts() {
    let n = loose_nodes(3);
    let way = Way::new();
    way.add_node(&n[0]).unwrap();
    way.add_node(&n[2]).unwrap();
    way.add_node_at(1, &n[1]).unwrap();
    assert_eq!(way.nodes().as_slice(), n.as_slice());
    assert!(n.iter().all(|x| refers_to(x, &way)));
}

#[test]
fn add_node_to_incomplete_way_fails() {
    let way = Way::with_id(7).unwrap();
    let node = node_at(0.0, 0.0);
    let err = way.add_node(&node).unwrap_err();
    assert_eq!(
        err,
        GraphError::IncompleteWay {
            way: way.id(),
            node: node.id()
        }
    );
    assert_eq!(way.nodes_count(), 0);
    assert!(!refers_to(&node, &way));
}

#[test]
fn add_node_at_past_end_fails() {
    let n = loose_nodes(2);
    let way = loose_way(&n[..1]);
    assert_eq!(
        way.add_node_at(3, &n[1]),
        Err(GraphError::IndexOutOfRange { offset: 3, len: 1 })
    );
    assert_eq!(way.nodes_count(), 1);
    assert!(!refers_to(&n[1], &way));
}

#[test]
fn remove_node_from_small_closed_way_opens_it() {
    let n = loose_nodes(3);
    let way = loose_way(&[n[0].clone(), n[1].clone(), n[2].clone(), n[0].clone()]);
    way.remove_node(&n[0]).unwrap();
    assert_eq!(way.nodes().as_slice(), &[n[1].clone(), n[2].clone()]);
    assert!(!way.is_closed());
    assert!(!refers_to(&n[0], &way));
}

#[test]
fn remove_closing_node_recloses_on_new_first() {
    let n = loose_nodes(4);
    let way = loose_way(&[
        n[0].clone(),
        n[1].clone(),
        n[2].clone(),
        n[3].clone(),
        n[0].clone(),
    ]);
    way.remove_node(&n[0]).unwrap();
    assert_eq!(
        way.nodes().as_slice(),
        &[n[1].clone(), n[2].clone(), n[3].clone(), n[1].clone()]
    );
    assert!(way.is_closed());
}

#[test]
fn remove_node_collapses_repeats() {
    let n = loose_nodes(3);
    let (a, b, c) = (&n[0], &n[1], &n[2]);
    let way = loose_way(&[a.clone(), b.clone(), a.clone(), c.clone()]);
    way.remove_node(b).unwrap();
    assert_eq!(way.nodes().as_slice(), &[a.clone(), c.clone()]);
}

#[test]
fn remove_node_on_incomplete_way_is_noop() {
    let way = Way::with_id(11).unwrap();
    assert!(way.remove_node(&node_at(0.0, 0.0)).is_ok());
}

#[test]
fn calculate_remove_nodes_does_not_mutate() {
    let n = loose_nodes(4);
    let ring = [
        n[0].clone(),
        n[1].clone(),
        n[2].clone(),
        n[3].clone(),
        n[0].clone(),
    ];
    let way = loose_way(&ring);

    let closing: NodeSet = [n[0].clone()].into_iter().collect();
    assert_eq!(
        way.calculate_remove_nodes(&closing),
        vec![n[1].clone(), n[2].clone(), n[3].clone(), n[1].clone()]
    );
    let inner: NodeSet = [n[2].clone()].into_iter().collect();
    assert_eq!(
        way.calculate_remove_nodes(&inner),
        vec![n[0].clone(), n[1].clone(), n[3].clone(), n[0].clone()]
    );
    assert_eq!(way.nodes().as_slice(), &ring);
}

#[test]
fn remove_nodes_drops_selection() {
    let n = loose_nodes(4);
    let way = loose_way(&n);
    let selection: NodeSet = [n[1].clone(), n[2].clone()].into_iter().collect();
    way.remove_nodes(&selection).unwrap();
    assert_eq!(way.nodes().as_slice(), &[n[0].clone(), n[3].clone()]);
    assert!(!refers_to(&n[1], &way));
    assert!(!refers_to(&n[2], &way));
}

#[test]
fn read_only_dataset_rejects_edits() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 3);
    let way = bound_way(&ds, &n[..2]);
    ds.set_read_only(true);

    let ro = GraphError::ReadOnlyViolation { dataset: ds.id() };
    assert_eq!(way.set_nodes([n[2].clone()]), Err(ro.clone()));
    assert_eq!(way.add_node(&n[2]), Err(ro.clone()));
    assert_eq!(way.remove_node(&n[0]), Err(ro.clone()));
    assert_eq!(way.put_tag("highway", "road"), Err(ro.clone()));
    assert_eq!(way.set_deleted(true), Err(ro));
    assert_eq!(way.nodes().as_slice(), &n[..2]);
    assert!(way.tag("highway").is_none());

    ds.set_read_only(false);
    way.add_node(&n[2]).unwrap();
    assert_eq!(way.nodes_count(), 3);
}

#[test]
fn delete_and_undelete_toggle_referrers() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 2);
    let way = bound_way(&ds, &n);

    way.set_deleted(true).unwrap();
    assert!(way.is_deleted());
    assert!(n.iter().all(|x| !refers_to(x, &way)));
    assert_eq!(way.nodes_count(), 2);

    way.set_deleted(false).unwrap();
    assert!(!way.is_deleted());
    assert!(n.iter().all(|x| refers_to(x, &way)));
}

#[test]
fn duplicate_shares_nodes_under_own_handle() {
    let n = loose_nodes(2);
    let way = loose_way(&n);
    way.put_tag("name", "Main Street").unwrap();

    let copy = way.duplicate(false, true).unwrap();
    assert_eq!(copy.id(), way.id());
    assert_ne!(copy.handle(), way.handle());
    assert_eq!(copy.tag("name").as_deref(), Some("Main Street"));
    for x in &n {
        assert!(refers_to(x, &way));
        assert!(refers_to(x, &copy));
        assert_eq!(x.referrers().len(), 2);
    }
}

#[test]
fn duplicate_with_cleared_metadata_is_new() {
    let way = Way::with_id_and_version(100, 4).unwrap();
    let copy = way.duplicate(true, false).unwrap();
    assert!(copy.is_new());
    assert_ne!(copy.id(), way.id());
    assert_eq!(copy.version(), 0);
    assert!(!copy.is_incomplete());
    assert!(copy.flags().is_modified());
    assert_eq!(copy.nodes_count(), 0);
}

#[test]
fn clone_from_replaces_nodes_and_attributes() {
    let n = loose_nodes(3);
    let source = Arc::new(loose_way(&n[..2]));
    source.put_tag("highway", "path").unwrap();
    let target = loose_way(&n[2..]);

    target
        .clone_from(&Primitive::Way(Arc::clone(&source)), true)
        .unwrap();
    assert_eq!(target.nodes().as_slice(), &n[..2]);
    assert_eq!(target.tag("highway").as_deref(), Some("path"));
    assert!(!refers_to(&n[2], &target));
    assert!(refers_to(&n[0], &target) && refers_to(&n[0], &source));
}

#[test]
fn clone_from_node_is_rejected() {
    let way = Way::new();
    let err = way
        .clone_from(&Primitive::Node(node_at(0.0, 0.0)), false)
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::WrongPrimitiveKind {
            expected: PrimitiveType::Way,
            found: PrimitiveType::Node
        }
    );
}

#[test]
fn save_then_load_restores_state() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 3);
    let way = bound_way(&ds, &n[..2]);
    way.put_tag("highway", "residential").unwrap();
    let saved = way.save();
    assert_eq!(saved.node_ids, vec![n[0].id(), n[1].id()]);

    way.set_nodes([n[2].clone()]).unwrap();
    way.remove_tag("highway").unwrap();

    way.load(&PrimitiveData::Way(saved.clone())).unwrap();
    assert_eq!(way.save(), saved);
    assert!(refers_to(&n[0], &way));
    assert!(!refers_to(&n[2], &way));
}

#[test]
fn load_completes_incomplete_way() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 2);
    let way = Arc::new(Way::with_id(77).unwrap());
    ds.add_way(Arc::clone(&way)).unwrap();
    assert!(way.is_incomplete());

    let data = WayData::new(way.id(), vec![n[0].id(), n[1].id()]);
    way.load(&PrimitiveData::Way(data)).unwrap();
    assert!(!way.is_incomplete());
    assert_eq!(way.nodes().as_slice(), n.as_slice());
}

#[test]
fn load_with_unknown_node_fails_cleanly() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 1);
    let way = bound_way(&ds, &n);
    let missing = PrimitiveId::new(999_999).unwrap();

    let data = WayData::new(way.id(), vec![n[0].id(), missing]);
    let err = way.load(&PrimitiveData::Way(data)).unwrap_err();
    assert!(matches!(
        err,
        GraphError::DataIntegrity(v) if v.kind == IntegrityKind::MissingNode
            && v.node == Some(missing)
    ));
    assert_eq!(way.nodes().as_slice(), n.as_slice());
}

#[test]
fn rejected_load_leaves_attributes_alone() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 3);
    let way = bound_way(&ds, &n[..2]);
    way.put_tag("highway", "track").unwrap();
    let mut data = way.save();
    way.remove_tag("highway").unwrap();
    let version = way.version();

    n[2].set_deleted(true);
    data.common.version = version + 3;
    data.node_ids = vec![n[0].id(), n[2].id()];
    let err = way.load(&PrimitiveData::Way(data)).unwrap_err();
    assert!(matches!(
        err,
        GraphError::DataIntegrity(v) if v.kind == IntegrityKind::DeletedNode
            && v.node == Some(n[2].id())
    ));
    assert_eq!(way.version(), version);
    assert!(way.tag("highway").is_none());
    assert_eq!(way.nodes().as_slice(), &n[..2]);
    assert!(!refers_to(&n[2], &way));
}

#[test]
fn load_of_deleted_record_drops_referrers() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 2);
    let way = bound_way(&ds, &n);
    let mut data = way.save();
    data.common.deleted = true;

    way.load(&PrimitiveData::Way(data)).unwrap();
    assert!(way.is_deleted());
    assert_eq!(way.nodes().as_slice(), n.as_slice());
    assert!(n.iter().all(|x| !refers_to(x, &way)));

    way.set_deleted(false).unwrap();
    assert!(n.iter().all(|x| refers_to(x, &way)));
}

#[test]
fn load_without_dataset_needs_empty_list() {
    let n = loose_nodes(1);
    let way = Way::new();
    let err = way
        .load(&PrimitiveData::Way(WayData::new(way.id(), vec![n[0].id()])))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::DataIntegrity(v) if v.kind == IntegrityKind::NoDataSet
    ));
    assert!(way.load(&PrimitiveData::Way(WayData::new(way.id(), Vec::new()))).is_ok());
}

#[test]
fn load_rejects_foreign_records() {
    let node = node_at(0.0, 0.0);
    let way = Way::new();
    assert_eq!(
        way.load(&PrimitiveData::Node(node.save())),
        Err(GraphError::WrongPrimitiveKind {
            expected: PrimitiveType::Way,
            found: PrimitiveType::Node
        })
    );
    let other = Way::new();
    assert_eq!(
        way.load(&PrimitiveData::Way(WayData::new(other.id(), Vec::new()))),
        Err(GraphError::IdMismatch {
            expected: way.id(),
            found: other.id()
        })
    );
}

#[test]
fn display_lists_node_ids() {
    let n = loose_nodes(2);
    let way = loose_way(&n);
    let s = way.to_string();
    assert!(s.starts_with(&format!("{{Way id={} ", way.id())));
    assert!(s.ends_with(&format!("nodes=[{}, {}]}}", n[0].id(), n[1].id())));
    assert!(Way::with_id(5).unwrap().to_string().ends_with("(incomplete)}"));
}

#[test]
fn readers_see_whole_snapshots() {
    let ds = DataSet::new();
    let n = dataset_nodes(&ds, 5);
    let left = n[..3].to_vec();
    let right = n[3..].to_vec();
    let way = bound_way(&ds, &left);

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                let next = if i % 2 == 0 { &right } else { &left };
                way.set_nodes(next.iter().cloned()).unwrap();
            }
        });
        for _ in 0..2 {
            s.spawn(|| {
                for _ in 0..200 {
                    let snap = way.nodes();
                    assert!(snap.as_slice() == left.as_slice() || snap.as_slice() == right.as_slice());
                    assert!(way.bbox().is_valid());
                }
            });
        }
    });
    assert_eq!(way.nodes().as_slice(), left.as_slice());
}

#[test]
fn derived_queries_read_one_snapshot() {
    let (a, b, c, d) = (
        node_at(0.0, 0.0),
        node_at(0.0, 1.0),
        node_at(1.0, 1.0),
        node_at(1.0, 0.0),
    );
    // Neither list is an area; closure of the second applied to the first
    // would be.
    let open = vec![a.clone(), b.clone(), c.clone(), d.clone()];
    let back_and_forth = vec![a.clone(), b.clone(), a.clone(), a.clone()];
    let way = loose_way(&open);
    let selection: NodeSet = [a.clone()].into_iter().collect();

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..500 {
                let next = if i % 2 == 0 { &back_and_forth } else { &open };
                way.set_nodes(next.iter().cloned()).unwrap();
            }
        });
        for _ in 0..2 {
            s.spawn(|| {
                for _ in 0..500 {
                    assert!(!way.is_area());

                    let at: Vec<NodeRef> =
                        way.angles().unwrap().into_iter().map(|(_, n)| n).collect();
                    assert!(
                        at == [b.clone(), c.clone()] || at == [b.clone(), a.clone(), a.clone()],
                        "angles at {at:?}"
                    );

                    let rest = way.calculate_remove_nodes(&selection);
                    assert!(
                        rest == [b.clone(), c.clone(), d.clone()] || rest == [b.clone()],
                        "removal gives {rest:?}"
                    );
                }
            });
        }
    });
    assert_eq!(way.nodes().as_slice(), open.as_slice());
}

proptest! {
    #[test]
    fn remove_double_is_idempotent(mut v in proptest::collection::vec(0u8..4, 0..20)) {
        let original = v.len();
        remove_double(&mut v);
        prop_assert!(v.len() >= original.min(2));
        prop_assert!(v.len() <= 2 || v.windows(2).all(|w| w[0] != w[1]));
        let once = v.clone();
        remove_double(&mut v);
        prop_assert_eq!(v, once);
    }

    #[test]
    fn referrers_track_node_list(
        lists in proptest::collection::vec(proptest::collection::vec(0usize..6, 0..8), 1..6)
    ) {
        let pool = loose_nodes(6);
        let way = Way::new();
        for list in lists {
            let next: Vec<NodeRef> = list.iter().map(|&i| pool[i].clone()).collect();
            way.set_nodes(next.iter().cloned()).unwrap();
            for n in &pool {
                prop_assert_eq!(refers_to(n, &way), next.contains(n));
            }
        }
    }
}
