// File: pawket-common/src/models/minigame.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum MiniGameOutcome {
    Win,
    Lose,
    Abort,
}

impl fmt::Display for MiniGameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiniGameOutcome::Win => write!(f, "win"),
            MiniGameOutcome::Lose => write!(f, "lose"),
            MiniGameOutcome::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for MiniGameOutcome {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win" => Ok(MiniGameOutcome::Win),
            "lose" => Ok(MiniGameOutcome::Lose),
            "abort" => Ok(MiniGameOutcome::Abort),
            _ => Err(format!("Unknown minigame outcome: {}", s)),
        }
    }
}

/// One persisted play-through: inputs, the stat deltas applied to the pet,
/// and the rewards granted. Written exactly once, at completion or abort.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct MiniGamePlay {
    pub play_id: Uuid,
    pub user_id: Uuid,
    pub pet_id: Uuid,
    pub game_level: i32,
    pub monster_count: i32,
    pub speed_multiplier: f64,
    pub outcome: MiniGameOutcome,
    pub hunger_delta: i32,
    pub mood_delta: i32,
    pub stamina_delta: i32,
    pub cleanliness_delta: i32,
    pub experience_reward: i64,
    pub points_reward: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub aborted: bool,
}
