//! Mapping between external user IDs and the dense index space the model uses.

use std::collections::{HashMap, HashSet};

use crate::models::{Edge, Profile};

/// Two-way map between user IDs and `0..len`.
///
/// Indices follow the order users were given in; a repeated ID keeps the
/// index of its first appearance.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    to_index: HashMap<String, usize>,
    to_id: Vec<String>,
}

impl IdMap {
    pub fn from_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::default();
        for user in users {
            let user = user.as_ref();
            if !map.to_index.contains_key(user) {
                map.to_index.insert(user.to_string(), map.to_id.len());
                map.to_id.push(user.to_string());
            }
        }
        map
    }

    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.to_index.get(id).copied()
    }

    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.to_id.get(index).map(String::as_str)
    }

    /// IDs in index order.
    pub fn ids(&self) -> &[String] {
        &self.to_id
    }

    /// Convert ID pairs to index pairs, dropping any pair with an unknown end.
    pub fn remap_edges(&self, pairs: &[(String, String)]) -> Vec<Edge> {
        pairs
            .iter()
            .filter_map(|(u, v)| Some(Edge::new(self.index_of(u)?, self.index_of(v)?)))
            .collect()
    }

    /// Convert index pairs back to ID pairs, dropping indices outside the map.
    pub fn resolve_edges(&self, edges: &[Edge]) -> Vec<(String, String)> {
        edges
            .iter()
            .filter_map(|e| Some((self.id_of(e.src)?.to_string(), self.id_of(e.dst)?.to_string())))
            .collect()
    }
}

/// Friendship pairs listed in `profiles`.
///
/// A profile contributes `(id, friend)` for each friend whose ID sorts after
/// its own, so every friendship is taken from the lower-ID side. Self
/// references and repeats are dropped; first appearance wins.
pub fn friendship_edges(profiles: &[Profile]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for profile in profiles {
        for friend in profile.friends() {
            if profile.id < *friend && seen.insert((profile.id.as_str(), friend.as_str())) {
                edges.push((profile.id.clone(), friend.clone()));
            }
        }
    }

    edges
}
