//! End-to-end engine tests: hand-built graphs with known answers plus
//! randomized cross-checks against the reference Dijkstra.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sssp::{dijkstra, solve, Graph, SolveOptions, SsspError};

fn assert_dist_eq(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if e.is_infinite() {
            assert!(a.is_infinite(), "vertex {i}: expected unreachable, got {a}");
        } else {
            assert!((a - e).abs() < 1e-9, "vertex {i}: {a} != {e}");
        }
    }
}

#[test]
fn path_graph_distances_and_predecessors() {
    let graph =
        Graph::from_edges(5, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)]);
    let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();
    assert_dist_eq(&outcome.dist, &[0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(outcome.pred, vec![None, Some(0), Some(1), Some(2), Some(3)]);
}

#[test]
fn diamond_tie_breaks_to_the_smaller_predecessor() {
    // 0 -> 1 -> 3 and 0 -> 2 -> 3, all unit weights: two equal paths.
    let graph =
        Graph::from_edges(4, &[(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 3, 1.0)]);
    let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();
    assert!((outcome.dist[3] - 2.0).abs() < 1e-12);
    assert_eq!(outcome.pred[3], Some(1));
}

#[test]
fn source_distance_is_zero_and_unreachables_stay_infinite() {
    let graph = Graph::from_edges(4, &[(0, 1, 3.5), (2, 3, 1.0)]);
    let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();
    assert_eq!(outcome.dist[0], 0.0);
    assert!((outcome.dist[1] - 3.5).abs() < 1e-12);
    assert!(outcome.dist[2].is_infinite());
    assert!(outcome.dist[3].is_infinite());
    assert_eq!(outcome.pred[2], None);
}

#[test]
fn zero_weight_edges_are_handled() {
    let graph = Graph::from_edges(
        4,
        &[(0, 1, 0.0), (1, 2, 0.0), (2, 3, 2.0), (0, 3, 5.0)],
    );
    let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();
    assert_dist_eq(&outcome.dist, &[0.0, 0.0, 0.0, 2.0]);
}

#[test]
fn cycles_do_not_confuse_the_engine() {
    let graph = Graph::from_edges(
        4,
        &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (2, 3, 1.0), (3, 3, 0.5)],
    );
    let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();
    assert_dist_eq(&outcome.dist, &[0.0, 1.0, 2.0, 3.0]);
}

fn random_graph(rng: &mut StdRng, n: usize, m: usize) -> Graph {
    let mut graph = Graph::new(n);
    for _ in 0..m {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        let w = rng.gen_range(0.0..100.0);
        graph.add_edge(u, v, w);
    }
    // A sprinkling of zero-weight edges stresses the tie-breaking.
    for _ in 0..m / 20 {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        graph.add_edge(u, v, 0.0);
    }
    graph
}

#[test]
fn random_sparse_graphs_match_dijkstra() {
    let mut rng = StdRng::seed_from_u64(0xD1CE);
    for case in 0..20 {
        let n = 50 + (case * 37) % 300;
        let m = n * 4;
        let graph = random_graph(&mut rng, n, m);
        let source = case % n;

        let expected = dijkstra(&graph, source).unwrap();
        let outcome = solve(&graph, source, &SolveOptions::default()).unwrap();
        assert_dist_eq(&outcome.dist, &expected);
    }
}

#[test]
fn random_dense_graph_matches_dijkstra() {
    let mut rng = StdRng::seed_from_u64(0xBEEF);
    let n = 120;
    let graph = random_graph(&mut rng, n, n * n / 4);
    let expected = dijkstra(&graph, 0).unwrap();
    let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();
    assert_dist_eq(&outcome.dist, &expected);
}

#[test]
fn raw_engine_labels_are_valid_upper_bounds() {
    // With the finalization sweep disabled the labels may be loose where
    // the bounded recursion cut off, but they must stay sound: never
    // below the true distance, and exact at the source.
    let mut rng = StdRng::seed_from_u64(7777);
    let graph = random_graph(&mut rng, 200, 800);

    let raw = solve(
        &graph,
        0,
        &SolveOptions { finalize_with_dijkstra: false, ..SolveOptions::default() },
    )
    .unwrap();
    let truth = dijkstra(&graph, 0).unwrap();

    assert_eq!(raw.dist[0], 0.0);
    for v in 0..200 {
        assert!(raw.dist[v] >= truth[v] - 1e-9, "vertex {v} undershot the true distance");
    }
}

#[test]
fn stats_are_collected_on_request() {
    let graph =
        Graph::from_edges(5, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)]);
    let without = solve(&graph, 0, &SolveOptions::default()).unwrap();
    assert!(without.stats.is_none());

    let with = solve(
        &graph,
        0,
        &SolveOptions { collect_stats: true, ..SolveOptions::default() },
    )
    .unwrap();
    let stats = with.stats.expect("stats requested");
    assert!(stats.bmssp_calls >= 1);
    assert!(stats.edge_relaxations >= 4);
    assert!(stats.max_recursion_depth >= 1);
}

#[test]
fn predecessors_form_shortest_path_trees() {
    let mut rng = StdRng::seed_from_u64(31337);
    let graph = random_graph(&mut rng, 150, 600);
    let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();

    for v in 0..150 {
        match outcome.pred[v] {
            Some(p) => {
                assert!(outcome.dist[p].is_finite());
                // Some edge p -> v must realize the label.
                let realized = graph
                    .edges_from(p)
                    .iter()
                    .any(|e| e.to == v && (outcome.dist[p] + e.weight - outcome.dist[v]).abs() < 1e-9);
                assert!(realized, "pred[{v}] = {p} does not realize dist[{v}]");
            }
            None => {
                assert!(v == 0 || outcome.dist[v].is_infinite());
            }
        }
    }
}

#[test]
fn errors_are_reported_not_panicked() {
    assert!(matches!(
        solve(&Graph::new(0), 0, &SolveOptions::default()),
        Err(SsspError::EmptyGraph)
    ));
    assert!(matches!(
        solve(&Graph::new(4), 4, &SolveOptions::default()),
        Err(SsspError::SourceOutOfBounds)
    ));
}
