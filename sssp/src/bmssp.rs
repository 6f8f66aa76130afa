//! Recursive BMSSP driver: bounded multi-source shortest paths below the
//! sorting barrier.
//!
//! Level ℓ pulls batches of pivots from the partial-order structure,
//! solves each batch one level down, then routes newly relaxed vertices by
//! distance range: [Bᵢ, B) re-enters the structure, [bᵢ, Bᵢ) is batched
//! onto its front, and anything ≥ B is out of range for this level.

use std::collections::HashSet;

use crate::base_case::{base_case, LevelResult};
use crate::find_pivots::find_pivots;
use crate::graph::Graph;
use crate::labels::{try_relax, Labels};
use crate::partial_order::PartialOrderDs;
use crate::stats::SsspStats;
use crate::{Params, SsspError};

/// Block-size parameter M = 2^((ℓ−1)·t), clamped to n+1.
fn block_size(level: usize, t: usize, n: usize) -> usize {
    let shift = (level - 1).saturating_mul(t);
    if shift >= usize::BITS as usize - 1 {
        n + 1
    } else {
        (1usize << shift).min(n + 1)
    }
}

/// Completion ceiling k·2^(ℓ·t), clamped to n+1.
fn completion_limit(level: usize, params: Params, n: usize) -> usize {
    let shift = level.saturating_mul(params.t);
    let scale = if shift >= usize::BITS as usize - 1 {
        usize::MAX / 2
    } else {
        1usize << shift
    };
    params.k.saturating_mul(scale).min(n + 1)
}

pub(crate) fn bmssp(
    graph: &Graph,
    labels: &mut Labels,
    params: Params,
    level: usize,
    bound: f64,
    sources: Vec<usize>,
    depth: usize,
    stats: &mut SsspStats,
) -> Result<LevelResult, SsspError> {
    stats.bmssp_calls += 1;
    stats.max_recursion_depth = stats.max_recursion_depth.max(depth);

    if level == 0 {
        return base_case(graph, labels, bound, &sources, params.k, stats);
    }

    let pivots_result = find_pivots(graph, labels, bound, &sources, params.k, stats);

    let n = graph.vertex_count();
    let mut ds = PartialOrderDs::new(block_size(level, params.t, n), bound);
    for &x in &pivots_result.pivots {
        ds.insert(x, labels.dist[x]);
        stats.ds_inserts += 1;
    }

    let mut settled: Vec<usize> = Vec::new();
    let mut settled_set: HashSet<usize> = HashSet::new();
    let mut last_boundary = bound;
    let limit = completion_limit(level, params, n);

    while settled.len() < limit && !ds.is_empty() {
        let (batch, batch_bound) = ds.pull();
        stats.ds_pulls += 1;
        if batch.is_empty() {
            break;
        }

        let sub = bmssp(
            graph,
            labels,
            params,
            level - 1,
            batch_bound,
            batch.clone(),
            depth + 1,
            stats,
        )?;
        last_boundary = last_boundary.min(sub.boundary);

        for &v in &sub.settled {
            if settled_set.insert(v) {
                settled.push(v);
            }
        }

        // Relax out of the completed set and classify by distance range.
        let mut stash: Vec<(usize, f64)> = Vec::new();
        for &u in &sub.settled {
            let du = labels.dist[u];
            for edge in graph.edges_from(u) {
                let nd = du + edge.weight;
                if try_relax(labels, u, edge.to, nd) {
                    stats.edge_relaxations += 1;
                    if nd >= bound {
                        // Out of range for this level.
                    } else if nd >= batch_bound {
                        ds.insert(edge.to, nd);
                        stats.ds_inserts += 1;
                    } else if nd >= sub.boundary {
                        stash.push((edge.to, nd));
                    }
                }
            }
        }

        // Pulled vertices the recursion left unfinished go back in front.
        for &x in &batch {
            let dx = labels.dist[x];
            if dx >= sub.boundary && dx < batch_bound && !settled_set.contains(&x) {
                stash.push((x, dx));
            }
        }

        if !stash.is_empty() {
            ds.batch_prepend(&stash);
            stats.ds_batch_prepends += 1;
        }
    }

    let boundary = last_boundary.min(bound);
    for &x in &pivots_result.reached {
        if labels.dist[x] < boundary && settled_set.insert(x) {
            settled.push(x);
        }
    }

    Ok(LevelResult { boundary, settled })
}
