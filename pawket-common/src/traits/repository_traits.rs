// File: pawket-common/src/traits/repository_traits.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::minigame::MiniGamePlay;
use crate::models::pet::Pet;
use crate::models::redeem::{EVoucherToken, RedeemLog};
use crate::models::user::User;
use crate::models::voucher::{Voucher, VoucherType};
use crate::models::wallet::{PointCredit, WalletEntryKind, WalletHistoryEntry};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), Error>;
    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error>;
}

/// The points ledger storage contract. Implementations must keep a balance
/// mutation and its history append in one transaction: both commit or
/// neither does. Amount validation (> 0) happens in the service layer;
/// implementations may assume positive amounts.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Creates the zero-balance wallet row for a new user.
    async fn create_wallet(&self, user_id: Uuid) -> Result<(), Error>;

    /// Current balance; `Error::NotFound` when the user has no wallet.
    async fn get_balance(&self, user_id: Uuid) -> Result<i64, Error>;

    /// Adds `amount` and appends a positive history entry.
    async fn apply_credit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: WalletEntryKind,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error>;

    /// Subtracts `amount` and appends a negative history entry. Fails with
    /// `Error::InsufficientBalance` (balance untouched) when the guard
    /// `balance >= amount` does not hold.
    async fn apply_debit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: WalletEntryKind,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error>;

    /// Most recent history entries, newest first.
    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletHistoryEntry>, Error>;

    /// Sum of all signed history amounts for the user; equals the balance
    /// whenever the ledger invariant holds.
    async fn history_total(&self, user_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
pub trait VoucherTypeRepository: Send + Sync {
    async fn create(&self, ty: &VoucherType) -> Result<(), Error>;
    async fn get(&self, voucher_type_id: Uuid) -> Result<Option<VoucherType>, Error>;
    async fn list(&self, limit: i64) -> Result<Vec<VoucherType>, Error>;
    /// Administrative correction only; issued instances keep referencing it.
    async fn update(&self, ty: &VoucherType) -> Result<(), Error>;
}

#[async_trait]
pub trait VoucherRepository: Send + Sync {
    /// Plain insert (free grants, rewards).
    async fn create(&self, voucher: &Voucher) -> Result<(), Error>;

    /// Purchase path: debits `cost` points, appends the wallet history
    /// entry and inserts the voucher row as one transaction, so a debit
    /// with no voucher (or the reverse) is never observable.
    async fn create_with_debit(
        &self,
        voucher: &Voucher,
        kind: WalletEntryKind,
        cost: i64,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error>;

    async fn get(&self, voucher_id: Uuid) -> Result<Option<Voucher>, Error>;
    async fn get_by_code(&self, code: &str) -> Result<Option<Voucher>, Error>;
    async fn code_exists(&self, code: &str) -> Result<bool, Error>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Voucher>, Error>;

    /// Marks the voucher used and writes the approved log in one
    /// transaction, guarded by `is_used = false`. Returns `false` (nothing
    /// written) when another request already used it.
    async fn mark_used_and_log(
        &self,
        voucher_id: Uuid,
        used_at: DateTime<Utc>,
        used_in_order: Option<&str>,
        log: &RedeemLog,
    ) -> Result<bool, Error>;

    /// Token path: consumes the token (guarded by unconsumed + unrevoked),
    /// marks the voucher used and writes the approved log, all in one
    /// transaction. Returns `false` and writes nothing if either guard
    /// fails.
    async fn consume_and_redeem(
        &self,
        token_id: Uuid,
        voucher_id: Uuid,
        used_at: DateTime<Utc>,
        used_in_order: Option<&str>,
        log: &RedeemLog,
    ) -> Result<bool, Error>;
}

#[async_trait]
pub trait EVoucherTokenRepository: Send + Sync {
    async fn insert(&self, token: &EVoucherToken) -> Result<(), Error>;
    async fn get_by_value(&self, token_value: &str) -> Result<Option<EVoucherToken>, Error>;
    /// Idempotent: a second revoke, or a revoke of a consumed token, is a
    /// no-op.
    async fn revoke(&self, token_value: &str) -> Result<(), Error>;
}

/// Append-only redemption audit log.
#[async_trait]
pub trait RedeemLogRepository: Send + Sync {
    async fn insert(&self, log: &RedeemLog) -> Result<(), Error>;
    async fn list_for_voucher(&self, voucher_id: Uuid, limit: i64) -> Result<Vec<RedeemLog>, Error>;
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<RedeemLog>, Error>;
}

#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn create(&self, pet: &Pet) -> Result<(), Error>;
    async fn get(&self, pet_id: Uuid) -> Result<Option<Pet>, Error>;
    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Pet>, Error>;
    async fn update(&self, pet: &Pet) -> Result<(), Error>;
}

#[async_trait]
pub trait MiniGamePlayRepository: Send + Sync {
    /// Persists the finished play, the updated pet, any point credits
    /// (game reward, level-up bonuses) and an optional reward voucher as
    /// one transaction.
    async fn record_completion(
        &self,
        play: &MiniGamePlay,
        pet: &Pet,
        credits: &[PointCredit],
        reward_voucher: Option<&Voucher>,
    ) -> Result<Vec<WalletHistoryEntry>, Error>;

    async fn get(&self, play_id: Uuid) -> Result<Option<MiniGamePlay>, Error>;
    async fn list_for_pet(&self, pet_id: Uuid, limit: i64) -> Result<Vec<MiniGamePlay>, Error>;
}
