//! # SSSP Crate
//!
//! Single-source shortest paths below the sorting barrier, after Duan,
//! Mehlhorn, Shao, Su and Yin: O(m·log^(2/3) n) on directed graphs with
//! non-negative real weights.
//!
//! ## Modules
//!
//! - `graph` – Adjacency-list graph
//! - `labels` – Distance/predecessor/hop labels and the relaxation rule
//! - `partial_order` – Block structure feeding the recursion (Lemma 3.1)
//! - `find_pivots` – Bounded-BFS source-set shrinkage (Algorithm 1)
//! - `base_case` – Bounded Dijkstra recursion floor (Algorithm 2)
//! - `bmssp` – Recursive driver (Algorithm 3)
//! - `dijkstra` – Reference implementation and refinement pass
//! - `degree` – Optional constant-degree pre-transform
//!
//! Ties between equal-length paths resolve lexicographically (fewer hops,
//! then smaller predecessor id), which makes runs deterministic.

pub mod base_case;
pub mod bmssp;
pub mod degree;
pub mod dijkstra;
pub mod find_pivots;
pub mod graph;
pub mod labels;
pub mod partial_order;
pub mod stats;

use std::time::Instant;

use thiserror::Error;

pub use base_case::LevelResult;
pub use dijkstra::dijkstra;
pub use graph::{Edge, Graph};
pub use labels::Labels;
pub use partial_order::PartialOrderDs;
pub use stats::SsspStats;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SsspError {
    #[error("base case requires a singleton source set")]
    NonSingletonSourceSet,
    #[error("source vertex is out of bounds")]
    SourceOutOfBounds,
    #[error("graph has no vertices")]
    EmptyGraph,
    #[error("invalid parameter")]
    InvalidParameter,
}

/// Engine parameters: k = ⌊log₂(n)^(1/3)⌋, t = ⌊log₂(n)^(2/3)⌋, both at
/// least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub k: usize,
    pub t: usize,
}

impl Params {
    pub fn compute(n: usize) -> Self {
        let log_n = (n.max(2) as f64).log2();
        let k = log_n.powf(1.0 / 3.0).floor() as usize;
        let t = log_n.powf(2.0 / 3.0).floor() as usize;
        Self { k: k.max(1), t: t.max(1) }
    }

    /// Top recursion level ⌈log₂(n)/t⌉, so 2^(ℓt) ≥ n covers any frontier.
    pub fn initial_level(self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        let log_n = (n as f64).log2();
        ((log_n / self.t as f64).ceil() as usize).max(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    /// Collect counters and timing into the outcome.
    pub collect_stats: bool,
    /// Finish with a lexicographic Dijkstra sweep over the labels. On by
    /// default: the recursion gates its queues on label updates, so a
    /// label reached through an equal-length tie can be left loose; the
    /// sweep tightens it and costs a near-no-op pass otherwise.
    pub finalize_with_dijkstra: bool,
    /// Run on the constant-degree transform and project distances back.
    pub reduce_degree: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { collect_stats: false, finalize_with_dijkstra: true, reduce_degree: false }
    }
}

#[derive(Debug, Clone)]
pub struct SsspOutcome {
    pub dist: Vec<f64>,
    pub pred: Vec<Option<usize>>,
    pub stats: Option<SsspStats>,
}

/// Compute single-source shortest paths over the whole graph.
pub fn solve(graph: &Graph, source: usize, options: &SolveOptions) -> Result<SsspOutcome, SsspError> {
    let n = graph.vertex_count();
    if n == 0 {
        return Err(SsspError::EmptyGraph);
    }
    if source >= n {
        return Err(SsspError::SourceOutOfBounds);
    }
    if !graph.weights_are_valid() {
        return Err(SsspError::InvalidParameter);
    }

    let started = Instant::now();
    let mut stats = SsspStats::default();

    let (dist, pred) = if options.reduce_degree {
        let reduced = degree::reduce(graph);
        let labels =
            run_engine(&reduced.graph, reduced.source_slot(source), options, &mut stats)?;
        reduced.project(&labels, n)
    } else {
        let labels = run_engine(graph, source, options, &mut stats)?;
        (labels.dist, labels.pred)
    };

    stats.elapsed_micros = started.elapsed().as_micros() as u64;
    Ok(SsspOutcome { dist, pred, stats: options.collect_stats.then_some(stats) })
}

fn run_engine(
    graph: &Graph,
    source: usize,
    options: &SolveOptions,
    stats: &mut SsspStats,
) -> Result<Labels, SsspError> {
    let n = graph.vertex_count();
    let params = Params::compute(n);
    let level = params.initial_level(n);

    let mut labels = Labels::new(n);
    labels.dist[source] = 0.0;
    labels.hops[source] = 0;

    bmssp::bmssp(graph, &mut labels, params, level, f64::INFINITY, vec![source], 1, stats)?;

    if options.finalize_with_dijkstra {
        dijkstra::refine_labels(graph, &mut labels, stats);
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_scale_with_vertex_count() {
        let small = Params::compute(2);
        assert_eq!(small, Params { k: 1, t: 1 });

        let big = Params::compute(1 << 20); // log2 = 20
        assert_eq!(big.k, 2); // 20^(1/3) ≈ 2.71 → 2
        assert_eq!(big.t, 7); // 20^(2/3) ≈ 7.37 → 7
        assert!(big.initial_level(1 << 20) >= 1);
    }

    #[test]
    fn initial_level_covers_the_graph() {
        let params = Params::compute(1000);
        let level = params.initial_level(1000);
        // 2^(level·t) must reach n.
        assert!(1usize << (level * params.t) >= 1000);
    }

    #[test]
    fn solve_validates_inputs() {
        assert!(matches!(
            solve(&Graph::new(0), 0, &SolveOptions::default()),
            Err(SsspError::EmptyGraph)
        ));
        assert!(matches!(
            solve(&Graph::new(3), 9, &SolveOptions::default()),
            Err(SsspError::SourceOutOfBounds)
        ));

        let mut bad = Graph::new(2);
        bad.add_edge(0, 1, f64::INFINITY);
        assert!(matches!(
            solve(&bad, 0, &SolveOptions::default()),
            Err(SsspError::InvalidParameter)
        ));
    }

    #[test]
    fn single_vertex_graph() {
        let graph = Graph::new(1);
        let outcome = solve(&graph, 0, &SolveOptions::default()).unwrap();
        assert_eq!(outcome.dist, vec![0.0]);
        assert_eq!(outcome.pred, vec![None]);
    }
}
