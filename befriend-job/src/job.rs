//! One end-to-end run: suggest, then notify.

use befriend_core::{BefriendConfig, BefriendError, Suggestions};

use crate::store::{create_store, SocialStore, StoreError};
use crate::subsystems::notify::create_suggestion_notifications;
use crate::subsystems::suggest::get_all_friend_suggestions;

impl From<StoreError> for BefriendError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(db) => BefriendError::Database(db),
            other => BefriendError::Store(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    pub suggestions: Suggestions,
    pub notifications_created: usize,
}

/// Compute suggestions for every user and persist them as notifications.
///
/// Only model errors fail the run; store problems degrade to fewer results.
pub async fn run_job(
    store: &dyn SocialStore,
    config: &BefriendConfig,
) -> Result<JobReport, BefriendError> {
    let suggestions =
        get_all_friend_suggestions(store, &config.model, config.suggestions.top_k).await?;

    let notifications_created =
        create_suggestion_notifications(store, &suggestions, config.store.dedup).await;

    tracing::info!(
        backend = store.name(),
        users = suggestions.len(),
        notifications_created,
        "Friend suggestion run complete"
    );

    Ok(JobReport {
        suggestions,
        notifications_created,
    })
}

/// Open the configured store, run the job against it, close it.
///
/// The store is closed on every path once it was opened.
pub async fn run(config: &BefriendConfig) -> Result<JobReport, BefriendError> {
    let store = create_store(config).await?;
    let result = run_job(store.as_ref(), config).await;
    store.close().await;
    result
}

/// Open the configured store, ping it, close it.
pub async fn health(config: &BefriendConfig) -> Result<String, BefriendError> {
    let store = create_store(config).await?;
    let result = store.ping().await;
    store.close().await;
    Ok(format!("{} store reachable: {}", store.name(), result?))
}

/// `User {id}: [a, b]` lines for the first `limit` users.
pub fn sample_lines(suggestions: &Suggestions, limit: usize) -> Vec<String> {
    suggestions
        .iter()
        .take(limit)
        .map(|(user, suggested)| format!("User {}: [{}]", user, suggested.join(", ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn test_sample_is_capped_and_ordered() {
        let suggestions: Suggestions = vec![
            ("u1", vec!["u2", "u3"]),
            ("u2", vec!["u1"]),
            ("u3", vec![]),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            sample_lines(&suggestions, 2),
            vec!["User u1: [u2, u3]".to_string(), "User u2: [u1]".to_string()]
        );
        assert_eq!(sample_lines(&suggestions, 10).len(), 3);
        assert_eq!(sample_lines(&suggestions, 10)[2], "User u3: []");
    }

    #[tokio::test]
    async fn test_empty_store_is_a_successful_noop() {
        let store = MemoryStore::default();
        let mut config = BefriendConfig::default();
        config.model.weights_path = "/nonexistent/gcn.safetensors".to_string();

        let report = run_job(&store, &config).await.unwrap();

        assert_eq!(report, JobReport::default());
    }

    #[test]
    fn test_store_errors_convert() {
        let e: BefriendError = StoreError::Rejected {
            message: "bad row".to_string(),
        }
        .into();
        assert!(matches!(e, BefriendError::Store(ref m) if m.contains("bad row")));

        let e: BefriendError = StoreError::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(e, BefriendError::Database(_)));
    }
}
