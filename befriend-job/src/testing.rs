//! In-memory store and a small deterministic model for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use befriend_core::gcn::{GcnConv, GcnModel};
use befriend_core::models::{NewNotification, Profile};
use ndarray::{Array1, Array2};

use crate::store::{SocialStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    profiles: Vec<Profile>,
    notifications: Mutex<Vec<NewNotification>>,
    fail_reads: bool,
    /// Senders whose inserts are rejected as bad rows.
    rejected_senders: Vec<String>,
    /// Inserts after this many succeed fail as a lost connection.
    disconnect_after: Option<usize>,
}

impl MemoryStore {
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn with_notifications(mut self, rows: Vec<NewNotification>) -> Self {
        self.notifications = Mutex::new(rows);
        self
    }

    pub fn rejecting_sender(mut self, sender: &str) -> Self {
        self.rejected_senders.push(sender.to_string());
        self
    }

    pub fn disconnecting_after(mut self, inserts: usize) -> Self {
        self.disconnect_after = Some(inserts);
        self
    }

    pub fn notifications(&self) -> Vec<NewNotification> {
        self.notifications.lock().unwrap().clone()
    }

    fn insert(&self, notification: &NewNotification) -> Result<(), StoreError> {
        let mut rows = self.notifications.lock().unwrap();
        if self.rejected_senders.contains(&notification.sender_id) {
            return Err(StoreError::Rejected {
                message: format!("sender {} rejected", notification.sender_id),
            });
        }
        if self.disconnect_after.is_some_and(|n| rows.len() >= n) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        rows.push(notification.clone());
        Ok(())
    }

    fn exists(&self, user_id: &str, sender_id: &str) -> bool {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.user_id == user_id && n.sender_id == sender_id && n.kind == "suggestion")
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn fetch_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.profiles.clone())
    }

    async fn suggestion_exists(&self, user_id: &str, sender_id: &str) -> Result<bool, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.exists(user_id, sender_id))
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<(), StoreError> {
        self.insert(notification)
    }

    async fn insert_notification_if_absent(
        &self,
        notification: &NewNotification,
    ) -> Result<bool, StoreError> {
        if self.exists(&notification.user_id, &notification.sender_id) {
            return Ok(false);
        }
        self.insert(notification).map(|_| true)
    }

    async fn ping(&self) -> Result<String, StoreError> {
        Ok("memory".to_string())
    }

    async fn close(&self) {}

    fn name(&self) -> &str {
        "memory"
    }
}

/// Four-dimensional embeddings, three hidden channels, `nodes` capacity.
pub fn tiny_model(nodes: usize) -> GcnModel {
    let embedding = Array2::from_shape_fn((nodes, 4), |(i, d)| ((i * 7 + d * 3) % 11) as f32 / 11.0 - 0.3);
    let conv1 = GcnConv::new(
        Array2::from_shape_fn((3, 4), |(o, i)| ((o + 2 * i) % 5) as f32 / 5.0 - 0.2),
        Array1::from_vec(vec![0.05, 0.0, 0.1]),
    )
    .unwrap();
    let conv2 = GcnConv::new(
        Array2::from_shape_fn((3, 3), |(o, i)| if o == i { 1.0 } else { 0.25 }),
        Array1::zeros(3),
    )
    .unwrap();
    GcnModel::new(embedding, conv1, conv2).unwrap()
}
