// File: pawket-core/src/services/minigame_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use pawket_common::models::minigame::{MiniGameOutcome, MiniGamePlay};
use pawket_common::models::pet::{Pet, StatDeltas};
use pawket_common::models::wallet::{PointCredit, WalletHistoryEntry};
use pawket_common::traits::repository_traits::{MiniGamePlayRepository, PetRepository};

use crate::Error;
use crate::services::issuance_service::IssuanceService;
use crate::services::pet_service::{ProgressionConfig, apply_experience, apply_stat_deltas};

/// Difficulty inputs of one play-through, recorded verbatim on the play
/// row.
#[derive(Debug, Clone, Copy)]
pub struct MiniGameInputs {
    pub game_level: i32,
    pub monster_count: i32,
    pub speed_multiplier: f64,
}

/// Reward table keyed on outcome. Win grants more than Lose; Abort grants
/// nothing. Optionally a Win also grants a voucher of the configured type.
#[derive(Debug, Clone)]
pub struct MiniGameRewardConfig {
    pub win_experience: i64,
    pub win_points: i64,
    pub lose_experience: i64,
    pub lose_points: i64,
    pub win_voucher_type: Option<Uuid>,
}

impl Default for MiniGameRewardConfig {
    fn default() -> Self {
        Self {
            win_experience: 30,
            win_points: 20,
            lose_experience: 10,
            lose_points: 5,
            win_voucher_type: None,
        }
    }
}

/// An in-flight play-through, handed out by `start` and consumed by
/// `complete` or `abort`.
#[derive(Debug, Clone)]
pub struct MiniGameSession {
    pub play_id: Uuid,
    pub user_id: Uuid,
    pub pet_id: Uuid,
    pub inputs: MiniGameInputs,
    pub started_at: DateTime<Utc>,
}

pub struct PlayResult {
    pub pet: Pet,
    pub play: MiniGamePlay,
    pub credited: Vec<WalletHistoryEntry>,
}

/// Runs the minigame lifecycle: ownership-checked start, then one
/// atomically persisted completion (pet stats + XP, play row, point
/// credits, optional reward voucher) or an abort with zero rewards.
pub struct MiniGameService {
    pet_repo: Arc<dyn PetRepository + Send + Sync>,
    play_repo: Arc<dyn MiniGamePlayRepository + Send + Sync>,
    issuance: Arc<IssuanceService>,
    rewards: MiniGameRewardConfig,
    progression: ProgressionConfig,
}

impl MiniGameService {
    pub fn new(
        pet_repo: Arc<dyn PetRepository + Send + Sync>,
        play_repo: Arc<dyn MiniGamePlayRepository + Send + Sync>,
        issuance: Arc<IssuanceService>,
        rewards: MiniGameRewardConfig,
        progression: ProgressionConfig,
    ) -> Self {
        Self {
            pet_repo,
            play_repo,
            issuance,
            rewards,
            progression,
        }
    }

    pub async fn start(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        inputs: MiniGameInputs,
    ) -> Result<MiniGameSession, Error> {
        let pet = self.owned_pet(user_id, pet_id).await?;
        Ok(MiniGameSession {
            play_id: Uuid::new_v4(),
            user_id,
            pet_id: pet.pet_id,
            inputs,
            started_at: Utc::now(),
        })
    }

    pub async fn complete(
        &self,
        session: MiniGameSession,
        outcome: MiniGameOutcome,
        stat_deltas: StatDeltas,
    ) -> Result<PlayResult, Error> {
        if outcome == MiniGameOutcome::Abort {
            return self.abort(session).await;
        }

        let mut pet = self.owned_pet(session.user_id, session.pet_id).await?;
        apply_stat_deltas(&mut pet, &stat_deltas);

        let (experience_reward, points_reward) = match outcome {
            MiniGameOutcome::Win => (self.rewards.win_experience, self.rewards.win_points),
            MiniGameOutcome::Lose => (self.rewards.lose_experience, self.rewards.lose_points),
            MiniGameOutcome::Abort => unreachable!(),
        };

        let level_before = pet.level;
        let level_up = apply_experience(&mut pet, experience_reward);

        let mut credits = Vec::new();
        if points_reward > 0 {
            credits.push(PointCredit::new(
                points_reward,
                format!("minigame {} reward", outcome),
            ));
        }
        for level in (level_before + 1)..=pet.level {
            credits.push(PointCredit::new(
                self.progression.level_up_bonus(level),
                "level up bonus",
            ));
        }

        let reward_voucher = match (outcome, self.rewards.win_voucher_type) {
            (MiniGameOutcome::Win, Some(type_id)) => {
                Some(self.issuance.mint(session.user_id, type_id).await?.0)
            }
            _ => None,
        };

        let play = MiniGamePlay {
            play_id: session.play_id,
            user_id: session.user_id,
            pet_id: session.pet_id,
            game_level: session.inputs.game_level,
            monster_count: session.inputs.monster_count,
            speed_multiplier: session.inputs.speed_multiplier,
            outcome,
            hunger_delta: stat_deltas.hunger,
            mood_delta: stat_deltas.mood,
            stamina_delta: stat_deltas.stamina,
            cleanliness_delta: stat_deltas.cleanliness,
            experience_reward,
            points_reward,
            voucher_code: reward_voucher.as_ref().map(|v| v.code.clone()),
            started_at: session.started_at,
            ended_at: Some(Utc::now()),
            aborted: false,
        };

        let credited = self
            .play_repo
            .record_completion(&play, &pet, &credits, reward_voucher.as_ref())
            .await?;

        info!(
            "minigame play {} finished: {} (+{} xp, +{} pts, {} level-ups)",
            play.play_id, outcome, experience_reward, points_reward, level_up.levels_gained
        );
        Ok(PlayResult {
            pet,
            play,
            credited,
        })
    }

    /// Short-circuits with zero rewards and no stat or XP mutation; the
    /// play row is still recorded, flagged aborted.
    pub async fn abort(&self, session: MiniGameSession) -> Result<PlayResult, Error> {
        let pet = self.owned_pet(session.user_id, session.pet_id).await?;

        let play = MiniGamePlay {
            play_id: session.play_id,
            user_id: session.user_id,
            pet_id: session.pet_id,
            game_level: session.inputs.game_level,
            monster_count: session.inputs.monster_count,
            speed_multiplier: session.inputs.speed_multiplier,
            outcome: MiniGameOutcome::Abort,
            hunger_delta: 0,
            mood_delta: 0,
            stamina_delta: 0,
            cleanliness_delta: 0,
            experience_reward: 0,
            points_reward: 0,
            voucher_code: None,
            started_at: session.started_at,
            ended_at: Some(Utc::now()),
            aborted: true,
        };

        self.play_repo
            .record_completion(&play, &pet, &[], None)
            .await?;

        info!("minigame play {} aborted", play.play_id);
        Ok(PlayResult {
            pet,
            play,
            credited: Vec::new(),
        })
    }

    async fn owned_pet(&self, user_id: Uuid, pet_id: Uuid) -> Result<Pet, Error> {
        let pet = self
            .pet_repo
            .get(pet_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("pet {}", pet_id)))?;
        if pet.user_id != user_id {
            return Err(Error::NotOwner { pet_id, user_id });
        }
        Ok(pet)
    }
}
