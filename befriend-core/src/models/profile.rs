use serde::{Deserialize, Serialize};

/// One row of the `profiles` resource: a user and the IDs they list as friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub friends: Option<Vec<String>>,
}

impl Profile {
    pub fn friends(&self) -> &[String] {
        self.friends.as_deref().unwrap_or_default()
    }
}
