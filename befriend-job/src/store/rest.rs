//! PostgREST / Supabase backend.
//!
//! Tables are addressed as `{base_url}/rest/v1/{table}` with the project key
//! sent both as `apikey` and as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use befriend_core::config::StoreConfig;
use befriend_core::models::{NewNotification, Profile, SUGGESTION_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use super::{SocialStore, StoreError};

const PROFILES: &str = "profiles";
const NOTIFICATIONS: &str = "notifications";

/// Unique key used for insert-if-absent.
const NOTIFICATION_KEY: &str = "user_id,sender_id,type";

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestSocialStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestSocialStore {
    /// Build from config, falling back to `SUPABASE_URL` / `SUPABASE_KEY`.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::with_base_url(
            config.resolved_rest_url(),
            config.resolved_api_key(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Create a client against an explicit base URL (for testing / integration)
    pub fn with_base_url(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        if base_url.is_empty() {
            return Err(StoreError::MissingSetting("store.rest_url / SUPABASE_URL"));
        }
        if api_key.is_empty() {
            return Err(StoreError::MissingSetting("store.api_key / SUPABASE_KEY"));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestError>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(body);

        tracing::error!(code = status.as_u16(), message = %message, "PostgREST error");

        Err(StoreError::Api {
            code: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SocialStore for RestSocialStore {
    async fn fetch_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let request = self
            .request(Method::GET, PROFILES)
            .query(&[("select", "id,friends")]);
        Ok(self.send(request).await?.json().await?)
    }

    async fn suggestion_exists(&self, user_id: &str, sender_id: &str) -> Result<bool, StoreError> {
        let request = self.request(Method::GET, NOTIFICATIONS).query(&[
            ("select", "id".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("sender_id", format!("eq.{sender_id}")),
            ("type", format!("eq.{SUGGESTION_TYPE}")),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<serde_json::Value> = self.send(request).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, NOTIFICATIONS)
            .header("Prefer", "return=minimal")
            .json(notification);
        self.send(request).await?;
        Ok(())
    }

    async fn insert_notification_if_absent(
        &self,
        notification: &NewNotification,
    ) -> Result<bool, StoreError> {
        let request = self
            .request(Method::POST, NOTIFICATIONS)
            .query(&[("on_conflict", NOTIFICATION_KEY)])
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(&[notification]);
        let created: Vec<serde_json::Value> = self.send(request).await?.json().await?;
        Ok(!created.is_empty())
    }

    async fn ping(&self) -> Result<String, StoreError> {
        let request = self
            .request(Method::GET, PROFILES)
            .query(&[("select", "id"), ("limit", "1")]);
        let response = self.send(request).await?;
        Ok(format!("PostgREST {} ({})", self.base_url, response.status()))
    }

    async fn close(&self) {
        tracing::debug!(base_url = %self.base_url, "Closing REST store");
    }

    fn name(&self) -> &str {
        "rest"
    }
}

// ============================================================================
// TESTS
// ============================================================================
