// File: pawket-core/src/repositories/postgres/pets.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::pet::Pet;
use pawket_common::traits::repository_traits::PetRepository;

#[derive(Clone)]
pub struct PostgresPetRepository {
    pool: Pool<Postgres>,
}

impl PostgresPetRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_pet(r: &sqlx::postgres::PgRow) -> Result<Pet, Error> {
    Ok(Pet {
        pet_id: r.try_get("pet_id")?,
        user_id: r.try_get("user_id")?,
        name: r.try_get("name")?,
        level: r.try_get("level")?,
        experience: r.try_get("experience")?,
        hunger: r.try_get("hunger")?,
        mood: r.try_get("mood")?,
        stamina: r.try_get("stamina")?,
        cleanliness: r.try_get("cleanliness")?,
        health: r.try_get("health")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

pub(crate) async fn update_pet_tx(
    tx: &mut Transaction<'_, Postgres>,
    pet: &Pet,
) -> Result<(), Error> {
    let res = sqlx::query(
        r#"
        UPDATE pets
        SET name = $2,
            level = $3,
            experience = $4,
            hunger = $5,
            mood = $6,
            stamina = $7,
            cleanliness = $8,
            health = $9,
            updated_at = $10
        WHERE pet_id = $1
        "#,
    )
    .bind(pet.pet_id)
    .bind(&pet.name)
    .bind(pet.level)
    .bind(pet.experience)
    .bind(pet.hunger)
    .bind(pet.mood)
    .bind(pet.stamina)
    .bind(pet.cleanliness)
    .bind(pet.health)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    if res.rows_affected() == 0 {
        return Err(Error::NotFound(format!("pet {}", pet.pet_id)));
    }
    Ok(())
}

#[async_trait]
impl PetRepository for PostgresPetRepository {
    async fn create(&self, pet: &Pet) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO pets (
                pet_id, user_id, name, level, experience,
                hunger, mood, stamina, cleanliness, health,
                created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            "#,
        )
        .bind(pet.pet_id)
        .bind(pet.user_id)
        .bind(&pet.name)
        .bind(pet.level)
        .bind(pet.experience)
        .bind(pet.hunger)
        .bind(pet.mood)
        .bind(pet.stamina)
        .bind(pet.cleanliness)
        .bind(pet.health)
        .bind(pet.created_at)
        .bind(pet.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, pet_id: Uuid) -> Result<Option<Pet>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT pet_id, user_id, name, level, experience,
                   hunger, mood, stamina, cleanliness, health,
                   created_at, updated_at
            FROM pets
            WHERE pet_id = $1
            "#,
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_pet(&r)).transpose()
    }

    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Pet>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT pet_id, user_id, name, level, experience,
                   hunger, mood, stamina, cleanliness, health,
                   created_at, updated_at
            FROM pets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_pet(&r)).transpose()
    }

    async fn update(&self, pet: &Pet) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        update_pet_tx(&mut tx, pet).await?;
        tx.commit().await?;
        Ok(())
    }
}
