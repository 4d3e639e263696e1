// File: pawket-common/src/models/wallet.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a wallet history entry is about. Point entries move the balance;
/// coupon/e-voucher entries record acquisitions at their point cost.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum WalletEntryKind {
    Point,
    Coupon,
    EVoucher,
}

impl fmt::Display for WalletEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletEntryKind::Point => write!(f, "point"),
            WalletEntryKind::Coupon => write!(f, "coupon"),
            WalletEntryKind::EVoucher => write!(f, "evoucher"),
        }
    }
}

impl FromStr for WalletEntryKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "point" => Ok(WalletEntryKind::Point),
            "coupon" => Ok(WalletEntryKind::Coupon),
            "evoucher" => Ok(WalletEntryKind::EVoucher),
            _ => Err(format!("Unknown wallet entry kind: {}", s)),
        }
    }
}

/// One point balance per user. Mutated only through ledger operations; the
/// invariant `points == sum of history amounts` must hold at all times.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct WalletBalance {
    pub user_id: Uuid,
    pub points: i64,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit record of a single balance mutation. `amount` is
/// signed: credits positive, debits negative. Never updated or deleted.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct WalletHistoryEntry {
    pub entry_id: Uuid,
    pub user_id: Uuid,
    pub kind: WalletEntryKind,
    pub amount: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl WalletHistoryEntry {
    pub fn new(user_id: Uuid, kind: WalletEntryKind, amount: i64, reason: &str) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            user_id,
            kind,
            amount,
            reason: reason.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A pending point credit carried into a storage transaction (minigame
/// rewards, level-up bonuses) so it commits together with the rest.
#[derive(Debug, Clone)]
pub struct PointCredit {
    pub amount: i64,
    pub reason: String,
}

impl PointCredit {
    pub fn new(amount: i64, reason: impl Into<String>) -> Self {
        Self {
            amount,
            reason: reason.into(),
        }
    }
}
