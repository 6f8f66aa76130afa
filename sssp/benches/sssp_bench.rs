use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sssp::{dijkstra, solve, Graph, SolveOptions};

/// Sparse random graph with a backbone path so most of it is reachable.
fn random_graph(seed: u64, n: usize, m: usize) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(n);
    for v in 1..n {
        graph.add_edge(v - 1, v, rng.gen_range(0.1..10.0));
    }
    for _ in 0..m.saturating_sub(n - 1) {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        graph.add_edge(u, v, rng.gen_range(0.1..100.0));
    }
    graph
}

fn bench_engines(c: &mut Criterion) {
    let mut group = c.benchmark_group("sssp");
    for &n in &[1_000usize, 10_000] {
        let graph = random_graph(0xACE0 + n as u64, n, n * 4);
        group.throughput(Throughput::Elements(graph.edge_count() as u64));

        group.bench_with_input(BenchmarkId::new("bmssp", n), &graph, |b, graph| {
            b.iter(|| solve(graph, 0, &SolveOptions::default()).unwrap().dist)
        });

        group.bench_with_input(
            BenchmarkId::new("bmssp_raw", n),
            &graph,
            |b, graph| {
                let options =
                    SolveOptions { finalize_with_dijkstra: false, ..SolveOptions::default() };
                b.iter(|| solve(graph, 0, &options).unwrap().dist)
            },
        );

        group.bench_with_input(BenchmarkId::new("dijkstra", n), &graph, |b, graph| {
            b.iter(|| dijkstra(graph, 0).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engines);
criterion_main!(benches);
