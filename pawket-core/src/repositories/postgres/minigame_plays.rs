// File: pawket-core/src/repositories/postgres/minigame_plays.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::minigame::MiniGamePlay;
use pawket_common::models::pet::Pet;
use pawket_common::models::voucher::Voucher;
use pawket_common::models::wallet::{PointCredit, WalletEntryKind, WalletHistoryEntry};
use pawket_common::traits::repository_traits::MiniGamePlayRepository;

use super::pets::update_pet_tx;
use super::vouchers::insert_voucher_tx;
use super::wallet::{credit_balance_tx, insert_history_tx};

#[derive(Clone)]
pub struct PostgresMiniGamePlayRepository {
    pool: Pool<Postgres>,
}

impl PostgresMiniGamePlayRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_play(r: &sqlx::postgres::PgRow) -> Result<MiniGamePlay, Error> {
    Ok(MiniGamePlay {
        play_id: r.try_get("play_id")?,
        user_id: r.try_get("user_id")?,
        pet_id: r.try_get("pet_id")?,
        game_level: r.try_get("game_level")?,
        monster_count: r.try_get("monster_count")?,
        speed_multiplier: r.try_get("speed_multiplier")?,
        outcome: r
            .try_get::<String, _>("outcome")?
            .parse()
            .map_err(Error::Parse)?,
        hunger_delta: r.try_get("hunger_delta")?,
        mood_delta: r.try_get("mood_delta")?,
        stamina_delta: r.try_get("stamina_delta")?,
        cleanliness_delta: r.try_get("cleanliness_delta")?,
        experience_reward: r.try_get("experience_reward")?,
        points_reward: r.try_get("points_reward")?,
        voucher_code: r.try_get("voucher_code")?,
        started_at: r.try_get("started_at")?,
        ended_at: r.try_get("ended_at")?,
        aborted: r.try_get("aborted")?,
    })
}

#[async_trait]
impl MiniGamePlayRepository for PostgresMiniGamePlayRepository {
    async fn record_completion(
        &self,
        play: &MiniGamePlay,
        pet: &Pet,
        credits: &[PointCredit],
        reward_voucher: Option<&Voucher>,
    ) -> Result<Vec<WalletHistoryEntry>, Error> {
        let mut tx = self.pool.begin().await?;

        update_pet_tx(&mut tx, pet).await?;

        sqlx::query(
            r#"
            INSERT INTO minigame_plays (
                play_id, user_id, pet_id,
                game_level, monster_count, speed_multiplier, outcome,
                hunger_delta, mood_delta, stamina_delta, cleanliness_delta,
                experience_reward, points_reward, voucher_code,
                started_at, ended_at, aborted
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)
            "#,
        )
        .bind(play.play_id)
        .bind(play.user_id)
        .bind(play.pet_id)
        .bind(play.game_level)
        .bind(play.monster_count)
        .bind(play.speed_multiplier)
        .bind(play.outcome.to_string())
        .bind(play.hunger_delta)
        .bind(play.mood_delta)
        .bind(play.stamina_delta)
        .bind(play.cleanliness_delta)
        .bind(play.experience_reward)
        .bind(play.points_reward)
        .bind(&play.voucher_code)
        .bind(play.started_at)
        .bind(play.ended_at)
        .bind(play.aborted)
        .execute(&mut *tx)
        .await?;

        let mut entries = Vec::new();
        for credit in credits {
            let entry = WalletHistoryEntry::new(
                play.user_id,
                WalletEntryKind::Point,
                credit.amount,
                &credit.reason,
            );
            credit_balance_tx(&mut tx, play.user_id, credit.amount).await?;
            insert_history_tx(&mut tx, &entry).await?;
            entries.push(entry);
        }

        if let Some(voucher) = reward_voucher {
            insert_voucher_tx(&mut tx, voucher).await?;
        }

        tx.commit().await?;
        Ok(entries)
    }

    async fn get(&self, play_id: Uuid) -> Result<Option<MiniGamePlay>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT play_id, user_id, pet_id,
                   game_level, monster_count, speed_multiplier, outcome,
                   hunger_delta, mood_delta, stamina_delta, cleanliness_delta,
                   experience_reward, points_reward, voucher_code,
                   started_at, ended_at, aborted
            FROM minigame_plays
            WHERE play_id = $1
            "#,
        )
        .bind(play_id)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_play(&r)).transpose()
    }

    async fn list_for_pet(&self, pet_id: Uuid, limit: i64) -> Result<Vec<MiniGamePlay>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT play_id, user_id, pet_id,
                   game_level, monster_count, speed_multiplier, outcome,
                   hunger_delta, mood_delta, stamina_delta, cleanliness_delta,
                   experience_reward, points_reward, voucher_code,
                   started_at, ended_at, aborted
            FROM minigame_plays
            WHERE pet_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            "#,
        )
        .bind(pet_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row_to_play(&row)?);
        }
        Ok(result)
    }
}
