//! Reference Dijkstra: the comparison baseline for the engine and the
//! optional label-refinement pass.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::Graph;
use crate::labels::{try_relax, Labels};
use crate::stats::SsspStats;
use crate::SsspError;

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    vertex: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plain binary-heap Dijkstra. Returns the distance array.
pub fn dijkstra(graph: &Graph, source: usize) -> Result<Vec<f64>, SsspError> {
    let n = graph.vertex_count();
    if n == 0 {
        return Err(SsspError::EmptyGraph);
    }
    if source >= n {
        return Err(SsspError::SourceOutOfBounds);
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut visited = vec![false; n];
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(State { cost: 0.0, vertex: source });

    while let Some(State { cost, vertex }) = heap.pop() {
        if visited[vertex] {
            continue;
        }
        visited[vertex] = true;

        for edge in graph.edges_from(vertex) {
            let next_cost = cost + edge.weight;
            if next_cost < dist[edge.to] {
                dist[edge.to] = next_cost;
                heap.push(State { cost: next_cost, vertex: edge.to });
            }
        }
    }

    Ok(dist)
}

/// Refinement pass over existing labels: a Dijkstra sweep seeded with
/// every finite label, applying the same lexicographic relaxation rule as
/// the recursive engine. Tightens any label the bounded recursion left
/// loose and settles equal-length paths onto the lex-minimal tree; a
/// cheap no-op sweep when labels are already tight. This is the knob
/// behind `SolveOptions::finalize_with_dijkstra`.
///
/// Terminates because each accepted relaxation strictly decreases the
/// per-vertex (dist, hops, pred) triple in a well-founded order.
pub(crate) fn refine_labels(graph: &Graph, labels: &mut Labels, stats: &mut SsspStats) {
    let mut heap = BinaryHeap::new();
    for v in 0..labels.len() {
        if labels.is_finite(v) {
            heap.push(State { cost: labels.dist[v], vertex: v });
        }
    }

    while let Some(State { cost, vertex }) = heap.pop() {
        if cost > labels.dist[vertex] {
            continue;
        }
        for edge in graph.edges_from(vertex) {
            let next_cost = cost + edge.weight;
            if try_relax(labels, vertex, edge.to, next_cost) {
                stats.edge_relaxations += 1;
                heap.push(State { cost: labels.dist[edge.to], vertex: edge.to });
            }
        }
    }
}
