//! Suggestion subsystem — from the stored friendship graph to per-user
//! friend suggestions.
//!
//! 1. Load users and friendships (empty on store failure)
//! 2. Map user IDs to dense indices; drop edges with unknown users
//! 3. Load the GCN and rank `top_k × users` non-edges
//! 4. Map back to user IDs and fan out, `top_k` per user

use befriend_core::config::ModelConfig;
use befriend_core::gcn::{GcnModel, ModelError};
use befriend_core::id_map::IdMap;
use befriend_core::scorer::predict_scored_links;
use befriend_core::suggestions::{fan_out_suggestions, Suggestions};

use crate::store::SocialStore;
use crate::subsystems::graph_loader::{fetch_users_and_friends, SocialGraph};

/// Number of remapped edges echoed at debug level.
const EDGE_SAMPLE: usize = 5;

/// Fetch the graph, load the weights and compute suggestions for every user.
///
/// An empty graph short-circuits before the weights are read. Weight and
/// inference errors propagate.
pub async fn get_all_friend_suggestions(
    store: &dyn SocialStore,
    model_config: &ModelConfig,
    top_k: usize,
) -> Result<Suggestions, ModelError> {
    let graph = fetch_users_and_friends(store).await;

    if graph.is_empty() {
        tracing::warn!("No users or friendship data available");
        return Ok(Suggestions::default());
    }

    let model = GcnModel::load(model_config)?;
    suggest_from_graph(&graph, &model, top_k)
}

/// The pure part of [`get_all_friend_suggestions`].
pub fn suggest_from_graph(
    graph: &SocialGraph,
    model: &GcnModel,
    top_k: usize,
) -> Result<Suggestions, ModelError> {
    if graph.is_empty() {
        return Ok(Suggestions::default());
    }

    let ids = IdMap::from_users(&graph.users);
    let edges = ids.remap_edges(&graph.edges);

    tracing::info!(
        users = ids.len(),
        friendships = graph.edges.len(),
        edges = edges.len(),
        "Mapped users to dense indices"
    );
    tracing::debug!(sample = ?&edges[..edges.len().min(EDGE_SAMPLE)], "Remapped edges");

    // Over-fetch so that most users can fill their quota.
    let budget = top_k.saturating_mul(ids.len());
    let ranked = predict_scored_links(model, &edges, budget)?;

    tracing::info!(
        predicted = ranked.len(),
        best = ranked.first().map(|s| s.score).unwrap_or_default(),
        worst = ranked.last().map(|s| s.score).unwrap_or_default(),
        "Ranked candidate friendships"
    );

    let predicted: Vec<_> = ranked.iter().map(|s| s.edge).collect();
    let resolved = ids.resolve_edges(&predicted);

    let suggestions = fan_out_suggestions(ids.ids(), &resolved, top_k);
    tracing::info!(
        users = suggestions.len(),
        suggestions = suggestions.total(),
        "Fanned out friend suggestions"
    );

    Ok(suggestions)
}

// ============================================================================
// TESTS
// ============================================================================
