// File: pawket-core/src/services/wallet_service.rs

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use pawket_common::models::wallet::{WalletEntryKind, WalletHistoryEntry};
use pawket_common::traits::repository_traits::WalletRepository;

use crate::Error;

/// The points ledger: the only way a user's balance changes. Every
/// mutation appends a history entry in the same storage transaction, so
/// `balance == sum(history)` holds at all times.
pub struct WalletService {
    wallet_repo: Arc<dyn WalletRepository + Send + Sync>,
}

impl WalletService {
    pub fn new(wallet_repo: Arc<dyn WalletRepository + Send + Sync>) -> Self {
        Self { wallet_repo }
    }

    pub async fn credit(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        let entry = self
            .wallet_repo
            .apply_credit(user_id, amount, WalletEntryKind::Point, reason)
            .await?;
        info!("credited {} points to user {} ({})", amount, user_id, reason);
        Ok(entry)
    }

    pub async fn debit(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        let entry = self
            .wallet_repo
            .apply_debit(user_id, amount, WalletEntryKind::Point, reason)
            .await?;
        info!("debited {} points from user {} ({})", amount, user_id, reason);
        Ok(entry)
    }

    pub async fn get_balance(&self, user_id: Uuid) -> Result<i64, Error> {
        self.wallet_repo.get_balance(user_id).await
    }

    pub async fn history(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletHistoryEntry>, Error> {
        self.wallet_repo.list_history(user_id, limit).await
    }

    /// Audit check: does the stored balance equal the signed sum of all
    /// history entries?
    pub async fn audit(&self, user_id: Uuid) -> Result<bool, Error> {
        let balance = self.wallet_repo.get_balance(user_id).await?;
        let total = self.wallet_repo.history_total(user_id).await?;
        if balance != total {
            debug!(
                "ledger mismatch for user {}: balance={} history_total={}",
                user_id, balance, total
            );
        }
        Ok(balance == total)
    }
}
