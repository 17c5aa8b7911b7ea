//! Graph loader — pulls users and friendships out of the store.
//!
//! Store failures do not abort the run: they are logged and the graph comes
//! back empty, which downstream treats the same as "nothing to suggest".

use befriend_core::id_map::friendship_edges;

use crate::store::SocialStore;

/// Users in fetch order plus friendship pairs between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialGraph {
    pub users: Vec<String>,
    pub edges: Vec<(String, String)>,
}

impl SocialGraph {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() || self.edges.is_empty()
    }
}

/// Fetch every profile and derive the friendship edge list.
pub async fn fetch_users_and_friends(store: &dyn SocialStore) -> SocialGraph {
    let profiles = match store.fetch_profiles().await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(backend = store.name(), error = %e, "Failed to fetch profiles");
            return SocialGraph::default();
        }
    };

    let edges = friendship_edges(&profiles);
    let users: Vec<String> = profiles.into_iter().map(|p| p.id).collect();

    tracing::info!(users = users.len(), edges = edges.len(), "Loaded social graph");

    SocialGraph { users, edges }
}
