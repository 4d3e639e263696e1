// File: pawket-core/src/repositories/postgres/user.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::user::User;
use pawket_common::traits::repository_traits::UserRepository;

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_user(r: &sqlx::postgres::PgRow) -> Result<User, Error> {
    Ok(User {
        user_id: r.try_get("user_id")?,
        username: r.try_get("username")?,
        password_hash: r.try_get("password_hash")?,
        created_at: r.try_get("created_at")?,
        last_seen: r.try_get("last_seen")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, password_hash, created_at, last_seen)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.last_seen)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT user_id, username, password_hash, created_at, last_seen
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT user_id, username, password_hash, created_at, last_seen
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_user(&r)).transpose()
    }
}
