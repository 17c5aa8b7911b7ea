//! Direct Postgres backend over an `sqlx` pool.
//!
//! Schema: `migrations/0001_social.sql`. Upserts rely on the unique index on
//! `notifications (user_id, sender_id, type)`.

use async_trait::async_trait;
use befriend_core::config::DatabaseConfig;
use befriend_core::db;
use befriend_core::models::{NewNotification, Profile, SUGGESTION_TYPE};
use sqlx::PgPool;

use super::{SocialStore, StoreError};

pub struct PgSocialStore {
    pool: PgPool,
}

impl PgSocialStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Ok(Self::from_pool(db::create_pool(config).await?))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQLSTATE classes that reject one row: 22 (data exception) and 23
/// (integrity constraint violation).
fn is_row_level_sqlstate(code: &str) -> bool {
    code.starts_with("22") || code.starts_with("23")
}

/// Row-level SQLSTATEs reject the row; anything else (missing table,
/// permissions, lost connection) stops the writer.
fn classify_write_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db_err)
            if db_err.code().is_some_and(|c| is_row_level_sqlstate(&c)) =>
        {
            StoreError::Rejected {
                message: db_err.message().to_string(),
            }
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl SocialStore for PgSocialStore {
    async fn fetch_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id::text AS id, friends::text[] AS friends FROM profiles",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn suggestion_exists(&self, user_id: &str, sender_id: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND sender_id = $2 AND type = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(sender_id)
        .bind(SUGGESTION_TYPE)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, sender_id, type, is_read)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&notification.user_id)
        .bind(&notification.sender_id)
        .bind(&notification.kind)
        .bind(notification.is_read)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;
        Ok(())
    }

    async fn insert_notification_if_absent(
        &self,
        notification: &NewNotification,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, sender_id, type, is_read)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, sender_id, type) DO NOTHING
            "#,
        )
        .bind(&notification.user_id)
        .bind(&notification.sender_id)
        .bind(&notification.kind)
        .bind(notification.is_read)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<String, StoreError> {
        Ok(db::health_check(&self.pool).await?)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Closed Postgres pool");
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
