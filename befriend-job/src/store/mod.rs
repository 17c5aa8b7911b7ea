//! Storage seam for profiles and notifications.
//!
//! The job talks to one [`SocialStore`] handle, opened in `main` and closed at
//! the end of the run. Two backends:
//! - **rest**: PostgREST / Supabase over HTTP
//! - **postgres**: direct `sqlx` pool against the same schema

use async_trait::async_trait;
use befriend_core::config::{BefriendConfig, StoreBackend};
use befriend_core::models::{NewNotification, Profile};
use thiserror::Error;

pub mod postgres;
pub mod rest;

pub use postgres::PgSocialStore;
pub use rest::RestSocialStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Row rejected: {message}")]
    Rejected { message: String },

    #[error("Missing store setting: {0}")]
    MissingSetting(&'static str),
}

impl StoreError {
    /// The store refused one row but is still reachable.
    ///
    /// Only row-level HTTP statuses count: 400 (bad payload), 409 (conflict)
    /// and 422 (unprocessable). Auth failures, missing routes and 5xx mean
    /// every later request would fail the same way.
    pub fn is_row_rejection(&self) -> bool {
        match self {
            StoreError::Api { code, .. } => matches!(code, 400 | 409 | 422),
            StoreError::Rejected { .. } => true,
            _ => false,
        }
    }
}

#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Every profile with its friend list.
    async fn fetch_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// Whether a `suggestion` notification for `(user_id, sender_id)` exists.
    async fn suggestion_exists(&self, user_id: &str, sender_id: &str) -> Result<bool, StoreError>;

    async fn insert_notification(&self, notification: &NewNotification) -> Result<(), StoreError>;

    /// Insert unless a row with the same `(user_id, sender_id, type)` exists.
    /// Returns `true` when a row was created.
    async fn insert_notification_if_absent(
        &self,
        notification: &NewNotification,
    ) -> Result<bool, StoreError>;

    /// Cheap round trip used by `--health`.
    async fn ping(&self) -> Result<String, StoreError>;

    /// Release connections. The handle must not be used afterwards.
    async fn close(&self);

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Open the backend selected by `store.backend`.
pub async fn create_store(config: &BefriendConfig) -> Result<Box<dyn SocialStore>, StoreError> {
    let store: Box<dyn SocialStore> = match config.store.backend {
        StoreBackend::Rest => Box::new(RestSocialStore::new(&config.store)?),
        StoreBackend::Postgres => Box::new(PgSocialStore::connect(&config.database).await?),
    };
    tracing::info!(backend = store.name(), "Opened social store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: u16) -> StoreError {
        StoreError::Api {
            code,
            message: "error".to_string(),
        }
    }

    #[test]
    fn test_row_level_statuses_are_rejections() {
        for code in [400, 409, 422] {
            assert!(api(code).is_row_rejection(), "{code}");
        }
        assert!(StoreError::Rejected {
            message: "bad row".to_string()
        }
        .is_row_rejection());
    }

    #[test]
    fn test_auth_and_server_failures_are_not_rejections() {
        for code in [401, 403, 404, 500, 502, 503] {
            assert!(!api(code).is_row_rejection(), "{code}");
        }
        assert!(!StoreError::Database(sqlx::Error::PoolClosed).is_row_rejection());
        assert!(!StoreError::MissingSetting("store.api_key").is_row_rejection());
    }
}
