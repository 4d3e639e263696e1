// File: pawket-core/src/repositories/postgres/vouchers.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::redeem::RedeemLog;
use pawket_common::models::voucher::Voucher;
use pawket_common::models::wallet::{WalletEntryKind, WalletHistoryEntry};
use pawket_common::traits::repository_traits::VoucherRepository;

use super::redeem_logs::insert_log_tx;
use super::wallet::{debit_balance_tx, insert_history_tx};

#[derive(Clone)]
pub struct PostgresVoucherRepository {
    pool: Pool<Postgres>,
}

impl PostgresVoucherRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_voucher(r: &sqlx::postgres::PgRow) -> Result<Voucher, Error> {
    Ok(Voucher {
        voucher_id: r.try_get("voucher_id")?,
        user_id: r.try_get("user_id")?,
        voucher_type_id: r.try_get("voucher_type_id")?,
        code: r.try_get("code")?,
        is_used: r.try_get("is_used")?,
        acquired_at: r.try_get("acquired_at")?,
        used_at: r.try_get("used_at")?,
        used_in_order: r.try_get("used_in_order")?,
    })
}

pub(crate) async fn insert_voucher_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher: &Voucher,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO vouchers (
            voucher_id, user_id, voucher_type_id, code,
            is_used, acquired_at, used_at, used_in_order
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(voucher.voucher_id)
    .bind(voucher.user_id)
    .bind(voucher.voucher_type_id)
    .bind(&voucher.code)
    .bind(voucher.is_used)
    .bind(voucher.acquired_at)
    .bind(voucher.used_at)
    .bind(&voucher.used_in_order)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Conditional use-marking guarded by `is_used = FALSE`; of two concurrent
/// redemptions exactly one sees `rows_affected == 1`.
async fn mark_used_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_id: Uuid,
    used_at: DateTime<Utc>,
    used_in_order: Option<&str>,
) -> Result<bool, Error> {
    let res = sqlx::query(
        r#"
        UPDATE vouchers
        SET is_used = TRUE, used_at = $2, used_in_order = $3
        WHERE voucher_id = $1 AND is_used = FALSE
        "#,
    )
    .bind(voucher_id)
    .bind(used_at)
    .bind(used_in_order)
    .execute(&mut **tx)
    .await?;

    Ok(res.rows_affected() == 1)
}

#[async_trait]
impl VoucherRepository for PostgresVoucherRepository {
    async fn create(&self, voucher: &Voucher) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        insert_voucher_tx(&mut tx, voucher).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_with_debit(
        &self,
        voucher: &Voucher,
        kind: WalletEntryKind,
        cost: i64,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error> {
        let entry = WalletHistoryEntry::new(voucher.user_id, kind, -cost, reason);

        let mut tx = self.pool.begin().await?;
        debit_balance_tx(&mut tx, voucher.user_id, cost).await?;
        insert_history_tx(&mut tx, &entry).await?;
        insert_voucher_tx(&mut tx, voucher).await?;
        tx.commit().await?;

        Ok(entry)
    }

    async fn get(&self, voucher_id: Uuid) -> Result<Option<Voucher>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT voucher_id, user_id, voucher_type_id, code,
                   is_used, acquired_at, used_at, used_in_order
            FROM vouchers
            WHERE voucher_id = $1
            "#,
        )
        .bind(voucher_id)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_voucher(&r)).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Voucher>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT voucher_id, user_id, voucher_type_id, code,
                   is_used, acquired_at, used_at, used_in_order
            FROM vouchers
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_voucher(&r)).transpose()
    }

    async fn code_exists(&self, code: &str) -> Result<bool, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM vouchers WHERE code = $1")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Voucher>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT voucher_id, user_id, voucher_type_id, code,
                   is_used, acquired_at, used_at, used_in_order
            FROM vouchers
            WHERE user_id = $1
            ORDER BY acquired_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row_to_voucher(&row)?);
        }
        Ok(result)
    }

    async fn mark_used_and_log(
        &self,
        voucher_id: Uuid,
        used_at: DateTime<Utc>,
        used_in_order: Option<&str>,
        log: &RedeemLog,
    ) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;

        if !mark_used_tx(&mut tx, voucher_id, used_at, used_in_order).await? {
            tx.rollback().await?;
            return Ok(false);
        }
        insert_log_tx(&mut tx, log).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn consume_and_redeem(
        &self,
        token_id: Uuid,
        voucher_id: Uuid,
        used_at: DateTime<Utc>,
        used_in_order: Option<&str>,
        log: &RedeemLog,
    ) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query(
            r#"
            UPDATE evoucher_tokens
            SET consumed_at = $2
            WHERE token_id = $1
              AND consumed_at IS NULL
              AND is_revoked = FALSE
              AND expires_at >= $2
            "#,
        )
        .bind(token_id)
        .bind(used_at)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        if !mark_used_tx(&mut tx, voucher_id, used_at, used_in_order).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_log_tx(&mut tx, log).await?;
        tx.commit().await?;

        Ok(true)
    }
}
