//! Candidate edge enumeration.
//!
//! Every unordered pair in `[0, num_nodes)` that is not already an edge is a
//! candidate. This is a full quadratic sweep with no neighbourhood pruning or
//! sampling, so it bounds how large a graph one run can handle.

use std::collections::HashSet;

use crate::models::Edge;

/// Number of nodes implied by an edge list: one past the highest index.
pub fn implied_num_nodes(edges: &[Edge]) -> usize {
    edges
        .iter()
        .map(|e| e.src.max(e.dst) + 1)
        .max()
        .unwrap_or(0)
}

/// All `(u, v)` with `u < v < implied_num_nodes(edges)` whose sorted form is
/// not in `edges`, in lexicographic order.
pub fn generate_candidates(edges: &[Edge]) -> Vec<Edge> {
    let num_nodes = implied_num_nodes(edges);
    let existing: HashSet<Edge> = edges.iter().map(|e| e.canonical()).collect();

    let mut candidates = Vec::new();
    for u in 0..num_nodes {
        for v in (u + 1)..num_nodes {
            let edge = Edge::new(u, v);
            if !existing.contains(&edge) {
                candidates.push(edge);
            }
        }
    }

    tracing::debug!(
        num_nodes,
        existing = existing.len(),
        candidates = candidates.len(),
        "Generated candidate edges"
    );

    candidates
}
