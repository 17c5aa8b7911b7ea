use serde::{Deserialize, Serialize};

/// `type` value of friend-suggestion notifications.
pub const SUGGESTION_TYPE: &str = "suggestion";

/// Insert payload for the `notifications` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub sender_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
}

impl NewNotification {
    /// Unread suggestion telling `user_id` about `sender_id`.
    pub fn suggestion(user_id: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            sender_id: sender_id.into(),
            kind: SUGGESTION_TYPE.to_string(),
            is_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_payload_serializes_type_field() {
        let n = NewNotification::suggestion("u1", "u2");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user_id": "u1",
                "sender_id": "u2",
                "type": "suggestion",
                "is_read": false
            })
        );
    }
}
