// File: pawket-core/src/repositories/postgres/redeem_logs.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::redeem::RedeemLog;
use pawket_common::traits::repository_traits::RedeemLogRepository;

#[derive(Clone)]
pub struct PostgresRedeemLogRepository {
    pool: Pool<Postgres>,
}

impl PostgresRedeemLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) async fn insert_log_tx(
    tx: &mut Transaction<'_, Postgres>,
    log: &RedeemLog,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO redeem_logs (
            log_id, voucher_id, token_id, user_id, status, context, attempted_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(log.log_id)
    .bind(log.voucher_id)
    .bind(log.token_id)
    .bind(log.user_id)
    .bind(log.status.to_string())
    .bind(&log.context)
    .bind(log.attempted_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn row_to_log(r: &sqlx::postgres::PgRow) -> Result<RedeemLog, Error> {
    Ok(RedeemLog {
        log_id: r.try_get("log_id")?,
        voucher_id: r.try_get("voucher_id")?,
        token_id: r.try_get("token_id")?,
        user_id: r.try_get("user_id")?,
        status: r
            .try_get::<String, _>("status")?
            .parse()
            .map_err(Error::Parse)?,
        context: r.try_get("context")?,
        attempted_at: r.try_get("attempted_at")?,
    })
}

#[async_trait]
impl RedeemLogRepository for PostgresRedeemLogRepository {
    async fn insert(&self, log: &RedeemLog) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        insert_log_tx(&mut tx, log).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_for_voucher(
        &self,
        voucher_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RedeemLog>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT log_id, voucher_id, token_id, user_id, status, context, attempted_at
            FROM redeem_logs
            WHERE voucher_id = $1
            ORDER BY attempted_at DESC
            LIMIT $2
            "#,
        )
        .bind(voucher_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row_to_log(&row)?);
        }
        Ok(result)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<RedeemLog>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT log_id, voucher_id, token_id, user_id, status, context, attempted_at
            FROM redeem_logs
            WHERE user_id = $1
            ORDER BY attempted_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row_to_log(&row)?);
        }
        Ok(result)
    }
}
