use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    /// Credential hash as produced by the surrounding auth layer; this core
    /// never inspects it.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, password_hash: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            last_seen: now,
        }
    }
}
