//! Run statistics, collected when the caller asks for them.

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SsspStats {
    pub bmssp_calls: usize,
    pub base_case_calls: usize,
    pub find_pivots_calls: usize,
    pub ds_inserts: usize,
    pub ds_pulls: usize,
    pub ds_batch_prepends: usize,
    pub edge_relaxations: usize,
    pub max_recursion_depth: usize,
    pub elapsed_micros: u64,
}
