//! Notifier subsystem — persists one `suggestion` notification per
//! (recipient, suggested friend) pair, skipping pairs already notified.
//!
//! - `check_then_insert`: lookup then insert. Two concurrent runs can both
//!   see "absent" and write duplicates; accepted for stores without a unique
//!   key on `(user_id, sender_id, type)`.
//! - `upsert`: a single insert-if-absent, race-free given that key.
//!
//! A rejected row is logged and skipped. A lost connection ends the pass and
//! the count so far is returned.

use befriend_core::config::DedupStrategy;
use befriend_core::models::NewNotification;
use befriend_core::suggestions::Suggestions;

use crate::store::{SocialStore, StoreError};

/// Write notifications for every suggestion. Returns how many rows were created.
pub async fn create_suggestion_notifications(
    store: &dyn SocialStore,
    suggestions: &Suggestions,
    strategy: DedupStrategy,
) -> usize {
    let mut created = 0usize;
    let mut skipped = 0usize;

    for (user_id, sender_id) in suggestions.pairs() {
        let notification = NewNotification::suggestion(user_id, sender_id);

        match write_one(store, &notification, strategy).await {
            Ok(true) => created += 1,
            Ok(false) => skipped += 1,
            Err(e) if e.is_row_rejection() => {
                tracing::warn!(user_id, sender_id, error = %e, "Failed to create notification");
            }
            Err(e) => {
                tracing::error!(
                    created,
                    error = %e,
                    "Error creating suggestion notifications, stopping"
                );
                return created;
            }
        }
    }

    tracing::info!(created, already_present = skipped, "Suggestion notifications written");
    created
}

async fn write_one(
    store: &dyn SocialStore,
    notification: &NewNotification,
    strategy: DedupStrategy,
) -> Result<bool, StoreError> {
    match strategy {
        DedupStrategy::Upsert => store.insert_notification_if_absent(notification).await,
        DedupStrategy::CheckThenInsert => {
            if store
                .suggestion_exists(&notification.user_id, &notification.sender_id)
                .await?
            {
                return Ok(false);
            }
            store.insert_notification(notification).await?;
            Ok(true)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn suggestions(entries: Vec<(&str, Vec<&str>)>) -> Suggestions {
        entries.into_iter().collect()
    }

    #[tokio::test]
    async fn test_existing_notification_is_not_duplicated() {
        for strategy in [DedupStrategy::CheckThenInsert, DedupStrategy::Upsert] {
            let store = MemoryStore::default()
                .with_notifications(vec![NewNotification::suggestion("u1", "u2")]);

            let created = create_suggestion_notifications(
                &store,
                &suggestions(vec![("u1", vec!["u2"])]),
                strategy,
            )
            .await;

            assert_eq!(created, 0, "strategy {strategy:?}");
            assert_eq!(store.notifications().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_second_run_creates_nothing() {
        let store = MemoryStore::default();
        let s = suggestions(vec![("u1", vec!["u2", "u3"]), ("u2", vec!["u1"])]);

        let first = create_suggestion_notifications(&store, &s, DedupStrategy::CheckThenInsert).await;
        let second = create_suggestion_notifications(&store, &s, DedupStrategy::CheckThenInsert).await;

        assert_eq!(first, 3);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn test_rows_are_unread_suggestions() {
        let store = MemoryStore::default();

        create_suggestion_notifications(&store, &suggestions(vec![("u1", vec!["u2"])]), DedupStrategy::Upsert)
            .await;

        let rows = store.notifications();
        assert_eq!(rows, vec![NewNotification::suggestion("u1", "u2")]);
        assert!(!rows[0].is_read);
        assert_eq!(rows[0].kind, "suggestion");
    }

    #[tokio::test]
    async fn test_rejected_row_is_skipped() {
        let store = MemoryStore::default().rejecting_sender("bad");
        let s = suggestions(vec![("u1", vec!["bad", "u2"])]);

        let created = create_suggestion_notifications(&store, &s, DedupStrategy::CheckThenInsert).await;

        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_connection_loss_returns_partial_count() {
        let store = MemoryStore::default().disconnecting_after(2);
        let s = suggestions(vec![("u1", vec!["u2", "u3", "u4"]), ("u2", vec!["u1"])]);

        let created = create_suggestion_notifications(&store, &s, DedupStrategy::CheckThenInsert).await;

        assert_eq!(created, 2);
        assert_eq!(store.notifications().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_stops_the_pass() {
        let store = MemoryStore::failing_reads();
        let s = suggestions(vec![("u1", vec!["u2"])]);

        let created = create_suggestion_notifications(&store, &s, DedupStrategy::CheckThenInsert).await;

        assert_eq!(created, 0);
        assert!(store.notifications().is_empty());
    }
}
