//! Constant-degree pre-transform.
//!
//! Each vertex v with d distinct neighbours becomes a zero-weight directed
//! cycle of d slot vertices, one per neighbour; the original edge
//! (u -> v, w) turns into an edge from u's v-slot to v's u-slot with
//! weight w. Every slot then has in/out degree ≤ 2 from its cycle plus at
//! most one crossing edge, which is the degree bound the paper's analysis
//! assumes. Shortest-path distances are preserved because cycle edges are
//! free.
//!
//! The representative slot of a vertex is the one for its smallest
//! neighbour id; distances project back by taking the minimum over a
//! vertex's slots.

use std::collections::{BTreeSet, HashMap};

use crate::graph::Graph;
use crate::labels::Labels;

pub struct ReducedGraph {
    pub graph: Graph,
    /// slot -> original vertex
    owner: Vec<usize>,
    /// original vertex -> its representative slot
    representative: Vec<usize>,
    /// original vertex -> (neighbour -> slot)
    slot_of: Vec<HashMap<usize, usize>>,
}

/// Rewrite `original` into its constant-degree form.
pub fn reduce(original: &Graph) -> ReducedGraph {
    let n = original.vertex_count();

    // Neighbour sets: union of in- and out-neighbours, ordered so slot
    // numbering (and thus the representative choice) is deterministic.
    let mut neighbours: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for u in 0..n {
        for edge in original.edges_from(u) {
            neighbours[u].insert(edge.to);
            neighbours[edge.to].insert(u);
        }
    }

    let mut owner = Vec::new();
    let mut representative = vec![0usize; n];
    let mut slot_of: Vec<HashMap<usize, usize>> = vec![HashMap::new(); n];

    for v in 0..n {
        representative[v] = owner.len();
        if neighbours[v].is_empty() {
            // Isolated vertex keeps a single slot so it still exists in
            // the transformed graph.
            owner.push(v);
            continue;
        }
        for &w in &neighbours[v] {
            slot_of[v].insert(w, owner.len());
            owner.push(v);
        }
    }

    let mut graph = Graph::new(owner.len());

    // Zero-weight cycles over each vertex's slots.
    for v in 0..n {
        let slots: Vec<usize> = neighbours[v].iter().map(|w| slot_of[v][w]).collect();
        if slots.len() > 1 {
            for i in 0..slots.len() {
                graph.add_edge(slots[i], slots[(i + 1) % slots.len()], 0.0);
            }
        }
    }

    // Crossing edges carry the original weights.
    for u in 0..n {
        for edge in original.edges_from(u) {
            let from = slot_of[u][&edge.to];
            let to = slot_of[edge.to][&u];
            graph.add_edge(from, to, edge.weight);
        }
    }

    ReducedGraph { graph, owner, representative, slot_of }
}

impl ReducedGraph {
    pub fn slot_count(&self) -> usize {
        self.owner.len()
    }

    /// Slot to launch the search from for an original source vertex.
    pub fn source_slot(&self, v: usize) -> usize {
        self.representative[v]
    }

    /// Maximum in/out degree over the transformed graph, for validation.
    pub fn max_degree(&self) -> usize {
        let n = self.graph.vertex_count();
        let mut in_deg = vec![0usize; n];
        let mut out_deg = vec![0usize; n];
        for u in 0..n {
            for edge in self.graph.edges_from(u) {
                out_deg[u] += 1;
                in_deg[edge.to] += 1;
            }
        }
        in_deg.into_iter().chain(out_deg).max().unwrap_or(0)
    }

    /// Project slot labels back onto original vertices: distance is the
    /// minimum over the vertex's slots; the predecessor is the owner of
    /// the first slot on the pred chain belonging to another vertex.
    pub fn project(&self, labels: &Labels, original_n: usize) -> (Vec<f64>, Vec<Option<usize>>) {
        let mut dist = vec![f64::INFINITY; original_n];
        let mut best_slot = vec![usize::MAX; original_n];
        for slot in 0..self.owner.len() {
            let v = self.owner[slot];
            if labels.dist[slot] < dist[v] {
                dist[v] = labels.dist[slot];
                best_slot[v] = slot;
            }
        }

        let mut pred = vec![None; original_n];
        for v in 0..original_n {
            let slot = best_slot[v];
            if slot == usize::MAX {
                continue;
            }
            // Walk out of v's zero-weight cycle; the chain is a tree, but
            // bound the walk by the slot count regardless.
            let mut cursor = labels.pred[slot];
            let mut steps = 0;
            while let Some(p) = cursor {
                if self.owner[p] != v {
                    pred[v] = Some(self.owner[p]);
                    break;
                }
                steps += 1;
                if steps > self.owner.len() {
                    break;
                }
                cursor = labels.pred[p];
            }
        }

        (dist, pred)
    }

    /// Slot of `v` dedicated to neighbour `w`, when the pair is adjacent.
    pub fn slot_for(&self, v: usize, w: usize) -> Option<usize> {
        self.slot_of[v].get(&w).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_reduces_to_degree_two_cycles() {
        let graph = Graph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0)]);
        let reduced = reduce(&graph);
        // Every vertex has two neighbours: two slots each.
        assert_eq!(reduced.slot_count(), 6);
        assert!(reduced.max_degree() <= 2);
    }

    #[test]
    fn isolated_vertices_keep_a_slot() {
        let graph = Graph::new(3);
        let reduced = reduce(&graph);
        assert_eq!(reduced.slot_count(), 3);
        assert_eq!(reduced.graph.edge_count(), 0);
    }

    #[test]
    fn star_center_cycle_connects_all_slots() {
        // Star 0 -> {1,2,3}: center grows three slots in a free cycle.
        let graph = Graph::from_edges(4, &[(0, 1, 5.0), (0, 2, 6.0), (0, 3, 7.0)]);
        let reduced = reduce(&graph);
        assert_eq!(reduced.slot_count(), 3 + 1 + 1 + 1);
        assert!(reduced.max_degree() <= 2);
        assert!(reduced.slot_for(0, 1).is_some());
        assert!(reduced.slot_for(1, 0).is_some());
        assert!(reduced.slot_for(1, 2).is_none());
    }
}
