// File: pawket-common/src/models/voucher.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum VoucherKind {
    Coupon,
    EVoucher,
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoucherKind::Coupon => write!(f, "coupon"),
            VoucherKind::EVoucher => write!(f, "evoucher"),
        }
    }
}

impl FromStr for VoucherKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coupon" => Ok(VoucherKind::Coupon),
            "evoucher" => Ok(VoucherKind::EVoucher),
            _ => Err(format!("Unknown voucher kind: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `discount_value` is a flat amount taken off the order total.
    Flat,
    /// `discount_value` is a percentage (0..=100) of the order total.
    Percent,
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountKind::Flat => write!(f, "flat"),
            DiscountKind::Percent => write!(f, "percent"),
        }
    }
}

impl FromStr for DiscountKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(DiscountKind::Flat),
            "percent" => Ok(DiscountKind::Percent),
            _ => Err(format!("Unknown discount kind: {}", s)),
        }
    }
}

/// Template describing a purchasable coupon or e-voucher: discount
/// mechanics, acquisition cost in points and a validity window. Immutable
/// once instances reference it, apart from administrative correction.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct VoucherType {
    pub voucher_type_id: Uuid,
    pub kind: VoucherKind,
    pub name: String,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub min_spend: i64,
    pub points_cost: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VoucherType {
    /// True iff `as_of` falls inside `[valid_from, valid_to]` (inclusive).
    pub fn is_valid_at(&self, as_of: DateTime<Utc>) -> bool {
        self.valid_from <= as_of && as_of <= self.valid_to
    }

    /// Discount this type grants on an order of `total`, or `None` when the
    /// minimum spend is not met. Never exceeds the total itself.
    pub fn discount_on(&self, total: i64) -> Option<i64> {
        if total < self.min_spend {
            return None;
        }
        let raw = match self.discount_kind {
            DiscountKind::Flat => self.discount_value,
            DiscountKind::Percent => total * self.discount_value / 100,
        };
        Some(raw.min(total))
    }
}

/// One issued coupon/e-voucher instance. Lifecycle: Issued -> Used
/// (terminal) or Issued -> Expired (terminal, derived from the type's
/// `valid_to`, never stored). It never reverts to unused.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Voucher {
    pub voucher_id: Uuid,
    pub user_id: Uuid,
    pub voucher_type_id: Uuid,
    pub code: String,
    pub is_used: bool,
    pub acquired_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_in_order: Option<String>,
}

impl Voucher {
    pub fn new(user_id: Uuid, voucher_type_id: Uuid, code: &str) -> Self {
        Self {
            voucher_id: Uuid::new_v4(),
            user_id,
            voucher_type_id,
            code: code.to_string(),
            is_used: false,
            acquired_at: Utc::now(),
            used_at: None,
            used_in_order: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_type(kind: DiscountKind, value: i64, min_spend: i64) -> VoucherType {
        let now = Utc::now();
        VoucherType {
            voucher_type_id: Uuid::new_v4(),
            kind: VoucherKind::Coupon,
            name: "test".into(),
            discount_kind: kind,
            discount_value: value,
            min_spend,
            points_cost: 100,
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn validity_window_is_inclusive() {
        let ty = sample_type(DiscountKind::Flat, 50, 0);
        assert!(ty.is_valid_at(ty.valid_from));
        assert!(ty.is_valid_at(ty.valid_to));
        assert!(!ty.is_valid_at(ty.valid_to + Duration::seconds(1)));
        assert!(!ty.is_valid_at(ty.valid_from - Duration::seconds(1)));
    }

    #[test]
    fn discount_respects_min_spend() {
        let ty = sample_type(DiscountKind::Flat, 50, 200);
        assert_eq!(ty.discount_on(199), None);
        assert_eq!(ty.discount_on(200), Some(50));
    }

    #[test]
    fn percent_discount_is_proportional_and_capped() {
        let ty = sample_type(DiscountKind::Percent, 10, 0);
        assert_eq!(ty.discount_on(250), Some(25));

        let ty = sample_type(DiscountKind::Flat, 500, 0);
        assert_eq!(ty.discount_on(300), Some(300));
    }
}
