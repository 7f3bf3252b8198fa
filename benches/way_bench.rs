use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use waygraph::prelude::*;

fn ring(ds: &Arc<DataSet>, len: usize) -> (Arc<Way>, Vec<NodeRef>) {
    let step = std::f64::consts::TAU / len as f64;
    let nodes: Vec<NodeRef> = (0..len)
        .map(|i| {
            let a = i as f64 * step;
            let node = Node::new(Some(LatLon::new(a.sin() * 0.01, a.cos() * 0.01)));
            ds.add_node(node.clone()).expect("add node");
            node
        })
        .collect();
    let way = Arc::new(Way::new());
    way.set_nodes(nodes.iter().chain(nodes.first()).cloned())
        .expect("set nodes");
    ds.add_way(Arc::clone(&way)).expect("add way");
    (way, nodes)
}

fn bench_way(c: &mut Criterion) {
    let mut group = c.benchmark_group("way");

    for &len in &[16usize, 256] {
        let ds = DataSet::new();
        let (way, nodes) = ring(&ds, len);

        group.bench_with_input(BenchmarkId::new("set_nodes", len), &len, |b, _| {
            b.iter(|| way.set_nodes(black_box(nodes.iter().cloned())).expect("set nodes"))
        });
        group.bench_with_input(BenchmarkId::new("bbox_cached", len), &len, |b, _| {
            b.iter(|| black_box(way.bbox()))
        });
        group.bench_with_input(BenchmarkId::new("bbox_after_move", len), &len, |b, _| {
            b.iter(|| {
                way.update_position();
                black_box(way.bbox())
            })
        });
        group.bench_with_input(BenchmarkId::new("length", len), &len, |b, _| {
            b.iter(|| black_box(way.length()))
        });
        group.bench_with_input(BenchmarkId::new("angles", len), &len, |b, _| {
            b.iter(|| black_box(way.angles().expect("angles")))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_way);
criterion_main!(benches);
