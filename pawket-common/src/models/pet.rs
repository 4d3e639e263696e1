// File: pawket-common/src/models/pet.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 100;

/// A user's virtual pet. Level starts at 1, experience at 0; the four
/// condition stats and health are bounded to [0, 100].
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Pet {
    pub pet_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub level: i32,
    pub experience: i64,
    pub hunger: i32,
    pub mood: i32,
    pub stamina: i32,
    pub cleanliness: i32,
    pub health: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    pub fn new(user_id: Uuid, name: &str) -> Self {
        let now = Utc::now();
        Self {
            pet_id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            level: 1,
            experience: 0,
            hunger: STAT_MAX,
            mood: STAT_MAX,
            stamina: STAT_MAX,
            cleanliness: STAT_MAX,
            health: STAT_MAX,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Signed per-stat adjustments from a care action or minigame play.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct StatDeltas {
    pub hunger: i32,
    pub mood: i32,
    pub stamina: i32,
    pub cleanliness: i32,
}
