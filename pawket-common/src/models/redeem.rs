// File: pawket-common/src/models/redeem.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short-lived, single-use proof-of-redemption credential bound to one
/// e-voucher (scan-to-redeem flows). Lifecycle: Active -> Expired
/// (time-based), Active -> Revoked (explicit) or Active -> Consumed
/// (successful redemption); all three are terminal.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct EVoucherToken {
    pub token_id: Uuid,
    pub voucher_id: Uuid,
    pub token_value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<DateTime<Utc>>,
}

impl EVoucherToken {
    pub fn new(voucher_id: Uuid, token_value: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_id: Uuid::new_v4(),
            voucher_id,
            token_value: token_value.to_string(),
            issued_at: now,
            expires_at: now + ttl,
            is_revoked: false,
            consumed_at: None,
        }
    }

    pub fn is_expired(&self, as_of: DateTime<Utc>) -> bool {
        as_of > self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

/// Outcome recorded for a redemption attempt.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "snake_case")]
pub enum RedeemStatus {
    Approved,
    Rejected,
    Expired,
    AlreadyUsed,
    Revoked,
}

impl fmt::Display for RedeemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedeemStatus::Approved => write!(f, "approved"),
            RedeemStatus::Rejected => write!(f, "rejected"),
            RedeemStatus::Expired => write!(f, "expired"),
            RedeemStatus::AlreadyUsed => write!(f, "already_used"),
            RedeemStatus::Revoked => write!(f, "revoked"),
        }
    }
}

impl FromStr for RedeemStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" => Ok(RedeemStatus::Approved),
            "rejected" => Ok(RedeemStatus::Rejected),
            "expired" => Ok(RedeemStatus::Expired),
            "already_used" => Ok(RedeemStatus::AlreadyUsed),
            "revoked" => Ok(RedeemStatus::Revoked),
            _ => Err(format!("Unknown redeem status: {}", s)),
        }
    }
}

/// Append-only audit record of one redemption attempt, success or failure.
/// `voucher_id` is absent when the attempt never resolved to a voucher
/// (unknown or already-consumed token).
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct RedeemLog {
    pub log_id: Uuid,
    pub voucher_id: Option<Uuid>,
    pub token_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: RedeemStatus,
    pub context: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

impl RedeemLog {
    pub fn new(
        voucher_id: Option<Uuid>,
        token_id: Option<Uuid>,
        user_id: Option<Uuid>,
        status: RedeemStatus,
        context: Option<&str>,
    ) -> Self {
        Self {
            log_id: Uuid::new_v4(),
            voucher_id,
            token_id,
            user_id,
            status,
            context: context.map(String::from),
            attempted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_expiry_is_strictly_after_deadline() {
        let token = EVoucherToken::new(Uuid::new_v4(), "tok", Duration::minutes(5));
        assert!(!token.is_expired(token.expires_at));
        assert!(token.is_expired(token.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn redeem_status_round_trips_through_strings() {
        for status in [
            RedeemStatus::Approved,
            RedeemStatus::Rejected,
            RedeemStatus::Expired,
            RedeemStatus::AlreadyUsed,
            RedeemStatus::Revoked,
        ] {
            assert_eq!(status.to_string().parse::<RedeemStatus>(), Ok(status));
        }
    }
}
