//! Per-user fan-out of predicted friendships.

use std::collections::HashMap;

/// Suggested friends per recipient, in user fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    entries: Vec<(String, Vec<String>)>,
}

impl Suggestions {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, user_id: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(id, _)| id == user_id)
            .map(|(_, suggested)| suggested.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(id, suggested)| (id.as_str(), suggested.as_slice()))
    }

    /// Every `(recipient, suggested)` pair.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .flat_map(|(id, suggested)| suggested.iter().map(move |s| (id, s.as_str())))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, s)| s.len()).sum()
    }
}

impl<U, S> FromIterator<(U, Vec<S>)> for Suggestions
where
    U: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (U, Vec<S>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(id, suggested)| (id.into(), suggested.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

/// Spread ranked predictions to both endpoints, `top_k` per user.
///
/// Every user gets an entry, possibly empty. For each `(u, v)` in rank order,
/// `v` is added to `u` if `u` still has room, and separately `u` is added to
/// `v` if `v` still has room. A full user on one side does not stop the
/// other side from taking the edge.
pub fn fan_out_suggestions(
    users: &[String],
    predicted: &[(String, String)],
    top_k: usize,
) -> Suggestions {
    let mut entries: Vec<(String, Vec<String>)> =
        users.iter().map(|u| (u.clone(), Vec::new())).collect();
    let position: HashMap<&str, usize> = users
        .iter()
        .enumerate()
        .rev()
        .map(|(i, u)| (u.as_str(), i))
        .collect();

    for (u, v) in predicted {
        let (Some(&ui), Some(&vi)) = (position.get(u.as_str()), position.get(v.as_str())) else {
            continue;
        };
        if entries[ui].1.len() < top_k {
            entries[ui].1.push(v.clone());
        }
        if entries[vi].1.len() < top_k {
            entries[vi].1.push(u.clone());
        }
    }

    Suggestions { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(p: &[(&str, &str)]) -> Vec<(String, String)> {
        p.iter().map(|(u, v)| (u.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_every_user_gets_an_entry() {
        let result = fan_out_suggestions(&users(&["a", "b", "c"]), &[], 4);
        assert_eq!(result.len(), 3);
        assert_eq!(result.get("c"), Some(&[][..]));
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_each_edge_suggests_both_ways() {
        let result = fan_out_suggestions(&users(&["a", "b", "c"]), &pairs(&[("a", "c")]), 4);

        assert_eq!(result.get("a").unwrap(), &["c".to_string()]);
        assert_eq!(result.get("c").unwrap(), &["a".to_string()]);
        assert!(result.get("b").unwrap().is_empty());
    }

    #[test]
    fn test_user_quota_caps_suggestions() {
        let predicted = pairs(&[("a", "b"), ("a", "c"), ("a", "d")]);
        let result = fan_out_suggestions(&users(&["a", "b", "c", "d"]), &predicted, 2);

        assert_eq!(result.get("a").unwrap(), &["b".to_string(), "c".to_string()]);
        // a is full, but d still takes the edge.
        assert_eq!(result.get("d").unwrap(), &["a".to_string()]);
    }

    #[test]
    fn test_fewer_candidates_than_quota() {
        let predicted = pairs(&[("u1", "u2"), ("u1", "u3")]);
        let result = fan_out_suggestions(&users(&["u1", "u2", "u3"]), &predicted, 4);

        assert_eq!(result.get("u1").unwrap().len(), 2);
    }

    #[test]
    fn test_pairs_iterate_in_user_order() {
        let predicted = pairs(&[("a", "b")]);
        let result = fan_out_suggestions(&users(&["b", "a"]), &predicted, 4);

        let collected: Vec<(&str, &str)> = result.pairs().collect();
        assert_eq!(collected, vec![("b", "a"), ("a", "b")]);
    }

    #[test]
    fn test_collect_from_map_like_input() {
        let suggestions: Suggestions = vec![("u1", vec!["u2"])].into_iter().collect();
        assert_eq!(suggestions.pairs().collect::<Vec<_>>(), vec![("u1", "u2")]);
    }
}
