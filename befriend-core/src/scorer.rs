//! Link scoring and top-k selection.
//!
//! A candidate's score is `sigmoid(emb[u] · emb[v])` over the GCN output.
//! Ranking keeps the scores internally; [`predict_new_links`] drops them at
//! the boundary.

use std::cmp::Ordering;

use ndarray::Array2;

use crate::candidates::generate_candidates;
use crate::gcn::{GcnModel, ModelError};
use crate::models::{Edge, ScoredEdge};

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn by_score_desc(a: &ScoredEdge, b: &ScoredEdge) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Score each candidate against the node embeddings.
///
/// Candidates must index rows of `embeddings`.
pub fn score_candidates(embeddings: &Array2<f32>, candidates: &[Edge]) -> Vec<ScoredEdge> {
    candidates
        .iter()
        .map(|&edge| {
            let dot = embeddings.row(edge.src).dot(&embeddings.row(edge.dst));
            ScoredEdge {
                edge,
                score: sigmoid(dot),
            }
        })
        .collect()
}

/// The `min(k, len)` highest-scoring entries, best first.
///
/// Equal scores come out in whatever order the partial selection leaves them.
pub fn top_k_scored(mut scored: Vec<ScoredEdge>, k: usize) -> Vec<ScoredEdge> {
    let k = k.min(scored.len());
    if k == 0 {
        return Vec::new();
    }

    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, by_score_desc);
        scored.truncate(k);
    }
    scored.sort_by(by_score_desc);
    scored
}

/// Embed the graph, enumerate non-edges and keep the `top_k` best.
///
/// `edges` are in dense index space; the model's capacity must cover every
/// index. No candidates is not an error.
pub fn predict_scored_links(
    model: &GcnModel,
    edges: &[Edge],
    top_k: usize,
) -> Result<Vec<ScoredEdge>, ModelError> {
    let embeddings = model.embed(edges)?;

    let candidates = generate_candidates(edges);
    if candidates.is_empty() {
        tracing::debug!("No candidate edges to score");
        return Ok(Vec::new());
    }

    let scored = score_candidates(&embeddings, &candidates);
    let top = top_k_scored(scored, top_k);

    tracing::debug!(
        candidates = candidates.len(),
        kept = top.len(),
        best = top.first().map(|s| s.score).unwrap_or_default(),
        "Scored candidate edges"
    );

    Ok(top)
}

/// [`predict_scored_links`] without the scores.
pub fn predict_new_links(
    model: &GcnModel,
    edges: &[Edge],
    top_k: usize,
) -> Result<Vec<Edge>, ModelError> {
    Ok(predict_scored_links(model, edges, top_k)?
        .into_iter()
        .map(|s| s.edge)
        .collect())
}
