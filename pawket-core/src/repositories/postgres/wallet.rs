// File: pawket-core/src/repositories/postgres/wallet.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::wallet::{WalletEntryKind, WalletHistoryEntry};
use pawket_common::traits::repository_traits::WalletRepository;

#[derive(Clone)]
pub struct PostgresWalletRepository {
    pool: Pool<Postgres>,
}

impl PostgresWalletRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) async fn insert_history_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry: &WalletHistoryEntry,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO wallet_history (entry_id, user_id, kind, amount, reason, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.entry_id)
    .bind(entry.user_id)
    .bind(entry.kind.to_string())
    .bind(entry.amount)
    .bind(&entry.reason)
    .bind(entry.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Unconditional balance increase inside an open transaction. Credits are
/// validated positive before they get here.
pub(crate) async fn credit_balance_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: i64,
) -> Result<(), Error> {
    let res = sqlx::query(
        r#"
        UPDATE wallet_balances
        SET points = points + $1, updated_at = $2
        WHERE user_id = $3
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    if res.rows_affected() == 0 {
        return Err(Error::NotFound(format!("wallet for user {}", user_id)));
    }
    Ok(())
}

/// Guarded balance decrease inside an open transaction. Returns
/// `InsufficientBalance` (and leaves the transaction poised for rollback)
/// when `points >= amount` does not hold.
pub(crate) async fn debit_balance_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: i64,
) -> Result<(), Error> {
    let res = sqlx::query(
        r#"
        UPDATE wallet_balances
        SET points = points - $1, updated_at = $2
        WHERE user_id = $3 AND points >= $1
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    if res.rows_affected() == 0 {
        let row_opt = sqlx::query("SELECT points FROM wallet_balances WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
        return match row_opt {
            Some(r) => {
                let available: i64 = r.try_get("points")?;
                Err(Error::InsufficientBalance {
                    available,
                    required: amount,
                })
            }
            None => Err(Error::NotFound(format!("wallet for user {}", user_id))),
        };
    }
    Ok(())
}

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn create_wallet(&self, user_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO wallet_balances (user_id, points, updated_at)
            VALUES ($1, 0, $2)
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_balance(&self, user_id: Uuid) -> Result<i64, Error> {
        let row_opt = sqlx::query("SELECT points FROM wallet_balances WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(r.try_get("points")?),
            None => Err(Error::NotFound(format!("wallet for user {}", user_id))),
        }
    }

    async fn apply_credit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: WalletEntryKind,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error> {
        let entry = WalletHistoryEntry::new(user_id, kind, amount, reason);

        let mut tx = self.pool.begin().await?;
        credit_balance_tx(&mut tx, user_id, amount).await?;
        insert_history_tx(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    async fn apply_debit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: WalletEntryKind,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error> {
        let entry = WalletHistoryEntry::new(user_id, kind, -amount, reason);

        let mut tx = self.pool.begin().await?;
        debit_balance_tx(&mut tx, user_id, amount).await?;
        insert_history_tx(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletHistoryEntry>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT entry_id, user_id, kind, amount, reason, created_at
            FROM wallet_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            result.push(WalletHistoryEntry {
                entry_id: row.try_get("entry_id")?,
                user_id: row.try_get("user_id")?,
                kind: row
                    .try_get::<String, _>("kind")?
                    .parse()
                    .map_err(Error::Parse)?,
                amount: row.try_get("amount")?,
                reason: row.try_get("reason")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(result)
    }

    async fn history_total(&self, user_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) AS total
            FROM wallet_history
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("total")?)
    }
}
