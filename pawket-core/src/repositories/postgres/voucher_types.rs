// File: pawket-core/src/repositories/postgres/voucher_types.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::voucher::VoucherType;
use pawket_common::traits::repository_traits::VoucherTypeRepository;

#[derive(Clone)]
pub struct PostgresVoucherTypeRepository {
    pool: Pool<Postgres>,
}

impl PostgresVoucherTypeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_type(r: &sqlx::postgres::PgRow) -> Result<VoucherType, Error> {
    Ok(VoucherType {
        voucher_type_id: r.try_get("voucher_type_id")?,
        kind: r
            .try_get::<String, _>("kind")?
            .parse()
            .map_err(Error::Parse)?,
        name: r.try_get("name")?,
        discount_kind: r
            .try_get::<String, _>("discount_kind")?
            .parse()
            .map_err(Error::Parse)?,
        discount_value: r.try_get("discount_value")?,
        min_spend: r.try_get("min_spend")?,
        points_cost: r.try_get("points_cost")?,
        valid_from: r.try_get("valid_from")?,
        valid_to: r.try_get("valid_to")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

#[async_trait]
impl VoucherTypeRepository for PostgresVoucherTypeRepository {
    async fn create(&self, ty: &VoucherType) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO voucher_types (
                voucher_type_id, kind, name, discount_kind, discount_value,
                min_spend, points_cost, valid_from, valid_to, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            "#,
        )
        .bind(ty.voucher_type_id)
        .bind(ty.kind.to_string())
        .bind(&ty.name)
        .bind(ty.discount_kind.to_string())
        .bind(ty.discount_value)
        .bind(ty.min_spend)
        .bind(ty.points_cost)
        .bind(ty.valid_from)
        .bind(ty.valid_to)
        .bind(ty.created_at)
        .bind(ty.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, voucher_type_id: Uuid) -> Result<Option<VoucherType>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT voucher_type_id, kind, name, discount_kind, discount_value,
                   min_spend, points_cost, valid_from, valid_to, created_at, updated_at
            FROM voucher_types
            WHERE voucher_type_id = $1
            "#,
        )
        .bind(voucher_type_id)
        .fetch_optional(&self.pool)
        .await?;

        row_opt.map(|r| row_to_type(&r)).transpose()
    }

    async fn list(&self, limit: i64) -> Result<Vec<VoucherType>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT voucher_type_id, kind, name, discount_kind, discount_value,
                   min_spend, points_cost, valid_from, valid_to, created_at, updated_at
            FROM voucher_types
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row_to_type(&row)?);
        }
        Ok(result)
    }

    async fn update(&self, ty: &VoucherType) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE voucher_types
            SET kind = $2,
                name = $3,
                discount_kind = $4,
                discount_value = $5,
                min_spend = $6,
                points_cost = $7,
                valid_from = $8,
                valid_to = $9,
                updated_at = $10
            WHERE voucher_type_id = $1
            "#,
        )
        .bind(ty.voucher_type_id)
        .bind(ty.kind.to_string())
        .bind(&ty.name)
        .bind(ty.discount_kind.to_string())
        .bind(ty.discount_value)
        .bind(ty.min_spend)
        .bind(ty.points_cost)
        .bind(ty.valid_from)
        .bind(ty.valid_to)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
