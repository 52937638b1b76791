use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account-level profile document. Its id is the account id itself, so
/// every account has at most one profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(account_id: Uuid, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: account_id,
            email: email.into(),
            display_name: None,
            preferences: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }
}
