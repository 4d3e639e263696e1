// File: pawket-core/src/repositories/postgres/evoucher_tokens.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use pawket_common::error::Error;
use pawket_common::models::redeem::EVoucherToken;
use pawket_common::traits::repository_traits::EVoucherTokenRepository;

#[derive(Clone)]
pub struct PostgresEVoucherTokenRepository {
    pool: Pool<Postgres>,
}

impl PostgresEVoucherTokenRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EVoucherTokenRepository for PostgresEVoucherTokenRepository {
    async fn insert(&self, token: &EVoucherToken) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO evoucher_tokens (
                token_id, voucher_id, token_value,
                issued_at, expires_at, is_revoked, consumed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.token_id)
        .bind(token.voucher_id)
        .bind(&token.token_value)
        .bind(token.issued_at)
        .bind(token.expires_at)
        .bind(token.is_revoked)
        .bind(token.consumed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_value(&self, token_value: &str) -> Result<Option<EVoucherToken>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT token_id, voucher_id, token_value,
                   issued_at, expires_at, is_revoked, consumed_at
            FROM evoucher_tokens
            WHERE token_value = $1
            "#,
        )
        .bind(token_value)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row_opt {
            Ok(Some(EVoucherToken {
                token_id: r.try_get("token_id")?,
                voucher_id: r.try_get("voucher_id")?,
                token_value: r.try_get("token_value")?,
                issued_at: r.try_get("issued_at")?,
                expires_at: r.try_get("expires_at")?,
                is_revoked: r.try_get("is_revoked")?,
                consumed_at: r.try_get("consumed_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn revoke(&self, token_value: &str) -> Result<(), Error> {
        // Consumed tokens stay consumed; already-revoked is a no-op.
        sqlx::query(
            r#"
            UPDATE evoucher_tokens
            SET is_revoked = TRUE
            WHERE token_value = $1 AND consumed_at IS NULL
            "#,
        )
        .bind(token_value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
