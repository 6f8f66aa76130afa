//! Pivot selection: k rounds of bounded relaxation from the source set,
//! then a predecessor-forest pass that keeps only sources whose shortest
//! path trees grew large enough to justify recursing through them.

use std::collections::{HashMap, HashSet};

use crate::graph::Graph;
use crate::labels::{try_relax, Labels, FP_EPSILON};
use crate::stats::SsspStats;

/// Output of pivot selection: the pivot subset P of the sources and the
/// full set W of vertices reached during the bounded BFS.
#[derive(Debug, Default)]
pub struct PivotsResult {
    pub pivots: Vec<usize>,
    pub reached: Vec<usize>,
}

/// Run k relaxation rounds from `sources` under distance bound `bound`.
///
/// If the reached set grows past k·|sources| the whole source set is
/// returned as pivots (early exit). Otherwise the predecessor forest
/// restricted to W is rooted at the sources and every root with a subtree
/// of at least k vertices becomes a pivot.
///
/// Time: O(min{k²|S|, k|W|}).
pub fn find_pivots(
    graph: &Graph,
    labels: &mut Labels,
    bound: f64,
    sources: &[usize],
    k: usize,
    stats: &mut SsspStats,
) -> PivotsResult {
    stats.find_pivots_calls += 1;

    if sources.is_empty() {
        return PivotsResult::default();
    }

    let mut reached: HashSet<usize> = sources.iter().copied().collect();
    let mut frontier: Vec<usize> = sources.to_vec();

    for _ in 1..=k {
        let mut next: HashSet<usize> = HashSet::new();
        for &u in &frontier {
            let du = labels.dist[u];
            for edge in graph.edges_from(u) {
                let nd = du + edge.weight;
                if try_relax(labels, u, edge.to, nd) {
                    stats.edge_relaxations += 1;
                    if nd < bound {
                        next.insert(edge.to);
                    }
                }
            }
        }

        reached.extend(next.iter().copied());

        if reached.len() > k * sources.len() {
            return PivotsResult {
                pivots: sources.to_vec(),
                reached: reached.into_iter().collect(),
            };
        }

        frontier = next.into_iter().collect();
        if frontier.is_empty() {
            break;
        }
    }

    // Predecessor forest restricted to W: edge (u -> v) belongs iff both
    // endpoints are reached, v's label goes through u, and the distance
    // identity holds to within the forest tolerance.
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for &u in &reached {
        let du = labels.dist[u];
        for edge in graph.edges_from(u) {
            if reached.contains(&edge.to)
                && labels.pred[edge.to] == Some(u)
                && (labels.dist[edge.to] - (du + edge.weight)).abs() < FP_EPSILON
            {
                children.entry(u).or_default().push(edge.to);
            }
        }
    }

    let sizes = subtree_sizes(&children, sources);
    let pivots = sources
        .iter()
        .copied()
        .filter(|s| sizes.get(s).copied().unwrap_or(0) >= k)
        .collect();

    PivotsResult { pivots, reached: reached.into_iter().collect() }
}

/// Subtree size per vertex, by iterative post-order DFS from each root.
fn subtree_sizes(
    children: &HashMap<usize, Vec<usize>>,
    roots: &[usize],
) -> HashMap<usize, usize> {
    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for &root in roots {
        let mut stack: Vec<(usize, bool)> = vec![(root, false)];
        while let Some((v, processed)) = stack.pop() {
            if processed {
                let mut size = 1;
                if let Some(ch) = children.get(&v) {
                    for child in ch {
                        size += sizes.get(child).copied().unwrap_or(0);
                    }
                }
                sizes.insert(v, size);
            } else {
                stack.push((v, true));
                if let Some(ch) = children.get(&v) {
                    for &child in ch {
                        stack.push((child, false));
                    }
                }
            }
        }
    }
    sizes
}
