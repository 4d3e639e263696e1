// File: pawket-core/src/services/pet_service.rs

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use pawket_common::models::pet::{Pet, STAT_MAX, STAT_MIN, StatDeltas};
use pawket_common::traits::repository_traits::PetRepository;

use crate::Error;
use crate::services::wallet_service::WalletService;

/// Reward schedule for level-ups. The default mirrors the portal's
/// long-standing formula `(level / 10 + 1) * 10`.
#[derive(Debug, Clone)]
pub struct ProgressionConfig {
    pub level_bonus_step: i64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            level_bonus_step: 10,
        }
    }
}

impl ProgressionConfig {
    pub fn level_up_bonus(&self, level: i32) -> i64 {
        (level as i64 / 10 + 1) * self.level_bonus_step
    }
}

/// Experience needed to advance from `level` to `level + 1`. Piecewise:
/// linear to level 10, quadratic to 100, exponential past that. Strictly
/// increasing for every level >= 1.
pub fn experience_required(level: i32) -> i64 {
    if level <= 10 {
        (40 * level + 60) as i64
    } else if level <= 100 {
        (0.8 * (level as f64).powi(2) + 380.0).floor() as i64
    } else {
        (285.69 * 1.06_f64.powi(level)).floor() as i64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LevelUp {
    pub leveled_up: bool,
    pub levels_gained: i32,
}

/// Adds `delta` experience (floored at 0) and applies as many level-ups as
/// the thresholds allow. Remainder experience is kept across level-ups,
/// never reset to zero.
pub fn apply_experience(pet: &mut Pet, delta: i64) -> LevelUp {
    pet.experience = (pet.experience + delta).max(0);

    let mut levels_gained = 0;
    while pet.experience >= experience_required(pet.level) {
        pet.experience -= experience_required(pet.level);
        pet.level += 1;
        levels_gained += 1;
    }

    LevelUp {
        leveled_up: levels_gained > 0,
        levels_gained,
    }
}

fn clamp_stat(value: i32) -> i32 {
    value.clamp(STAT_MIN, STAT_MAX)
}

/// Applies signed condition-stat deltas, clamping each stat to [0, 100].
pub fn apply_stat_deltas(pet: &mut Pet, deltas: &StatDeltas) {
    pet.hunger = clamp_stat(pet.hunger + deltas.hunger);
    pet.mood = clamp_stat(pet.mood + deltas.mood);
    pet.stamina = clamp_stat(pet.stamina + deltas.stamina);
    pet.cleanliness = clamp_stat(pet.cleanliness + deltas.cleanliness);
}

/// Pet progression: leveling, condition stats and level-up bonuses.
pub struct PetService {
    pet_repo: Arc<dyn PetRepository + Send + Sync>,
    wallet: Arc<WalletService>,
    config: ProgressionConfig,
}

impl PetService {
    pub fn new(
        pet_repo: Arc<dyn PetRepository + Send + Sync>,
        wallet: Arc<WalletService>,
        config: ProgressionConfig,
    ) -> Self {
        Self {
            pet_repo,
            wallet,
            config,
        }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub async fn create_pet(&self, user_id: Uuid, name: &str) -> Result<Pet, Error> {
        let pet = Pet::new(user_id, name);
        self.pet_repo.create(&pet).await?;
        Ok(pet)
    }

    pub async fn get_pet(&self, pet_id: Uuid) -> Result<Pet, Error> {
        self.pet_repo
            .get(pet_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("pet {}", pet_id)))
    }

    /// Grants experience outside the minigame path (events, admin tools),
    /// persisting the pet and crediting any level-up bonuses.
    pub async fn grant_experience(&self, pet_id: Uuid, delta: i64) -> Result<(Pet, LevelUp), Error> {
        let mut pet = self.get_pet(pet_id).await?;
        let before = pet.level;
        let result = apply_experience(&mut pet, delta);
        self.pet_repo.update(&pet).await?;

        if result.leveled_up {
            info!(
                "pet {} leveled up {} -> {} ({} xp)",
                pet.pet_id, before, pet.level, delta
            );
            for level in (before + 1)..=pet.level {
                self.wallet
                    .credit(pet.user_id, self.config.level_up_bonus(level), "level up bonus")
                    .await?;
            }
        }
        Ok((pet, result))
    }

    /// Applies condition-stat deltas and persists the pet.
    pub async fn adjust_stats(&self, pet_id: Uuid, deltas: &StatDeltas) -> Result<Pet, Error> {
        let mut pet = self.get_pet(pet_id).await?;
        apply_stat_deltas(&mut pet, deltas);
        self.pet_repo.update(&pet).await?;
        Ok(pet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_checkpoints() {
        assert_eq!(experience_required(1), 100);
        assert_eq!(experience_required(10), 460);
        assert_eq!(experience_required(11), 476);
        assert_eq!(
            experience_required(101),
            (285.69 * 1.06_f64.powi(101)).floor() as i64
        );
    }

    #[test]
    fn curve_is_strictly_increasing() {
        let mut prev = experience_required(1);
        for level in 2..=150 {
            let next = experience_required(level);
            assert!(next > prev, "curve not increasing at level {}", level);
            prev = next;
        }
    }

    fn test_pet() -> Pet {
        Pet::new(Uuid::new_v4(), "nibbles")
    }

    #[test]
    fn experience_below_threshold_keeps_level() {
        let mut pet = test_pet();
        pet.level = 5;
        pet.experience = 50;
        let result = apply_experience(&mut pet, 30);
        assert!(!result.leveled_up);
        assert_eq!(pet.level, 5);
        assert_eq!(pet.experience, 80);
    }

    #[test]
    fn multi_level_up_keeps_remainder() {
        let mut pet = test_pet();
        // Level 1 needs 100, level 2 needs 140; 250 xp crosses both with
        // 10 left over.
        let result = apply_experience(&mut pet, 250);
        assert!(result.leveled_up);
        assert_eq!(result.levels_gained, 2);
        assert_eq!(pet.level, 3);
        assert_eq!(pet.experience, 10);
    }

    #[test]
    fn negative_delta_floors_at_zero() {
        let mut pet = test_pet();
        pet.experience = 20;
        let result = apply_experience(&mut pet, -50);
        assert!(!result.leveled_up);
        assert_eq!(pet.experience, 0);
        assert_eq!(pet.level, 1);
    }

    #[test]
    fn stat_deltas_clamp_to_bounds() {
        let mut pet = test_pet();
        pet.hunger = 90;
        pet.mood = 5;
        apply_stat_deltas(
            &mut pet,
            &StatDeltas {
                hunger: 50,
                mood: -20,
                stamina: -10,
                cleanliness: 0,
            },
        );
        assert_eq!(pet.hunger, 100);
        assert_eq!(pet.mood, 0);
        assert_eq!(pet.stamina, 90);
        assert_eq!(pet.cleanliness, 100);
    }

    #[test]
    fn bonus_schedule_scales_with_level_bracket() {
        let config = ProgressionConfig::default();
        assert_eq!(config.level_up_bonus(2), 10);
        assert_eq!(config.level_up_bonus(10), 20);
        assert_eq!(config.level_up_bonus(25), 30);
    }
}
