// File: pawket-core/src/test_utils/memory.rs
//
// In-memory repositories backing the service stack in tests. They mirror
// the Postgres semantics that matter: the debit guard, the conditional
// use-marking, single-use token consumption and append-only history/logs.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::minigame::MiniGamePlay;
use pawket_common::models::pet::Pet;
use pawket_common::models::redeem::{EVoucherToken, RedeemLog};
use pawket_common::models::user::User;
use pawket_common::models::voucher::{Voucher, VoucherType};
use pawket_common::models::wallet::{PointCredit, WalletEntryKind, WalletHistoryEntry};
use pawket_common::traits::repository_traits::{
    EVoucherTokenRepository, MiniGamePlayRepository, PetRepository, RedeemLogRepository,
    UserRepository, VoucherRepository, VoucherTypeRepository, WalletRepository,
};

#[derive(Default)]
struct Ledger {
    balances: std::collections::HashMap<Uuid, i64>,
    history: Vec<WalletHistoryEntry>,
}

/// One struct implementing every repository trait, shared across services
/// via `Arc` coercion.
#[derive(Default)]
pub struct InMemoryRepositories {
    users: DashMap<Uuid, User>,
    ledger: Mutex<Ledger>,
    voucher_types: DashMap<Uuid, VoucherType>,
    vouchers: DashMap<Uuid, Voucher>,
    tokens: DashMap<Uuid, EVoucherToken>,
    logs: Mutex<Vec<RedeemLog>>,
    pets: DashMap<Uuid, Pet>,
    plays: DashMap<Uuid, MiniGamePlay>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_logs(&self) -> std::sync::MutexGuard<'_, Vec<RedeemLog>> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn debit_locked(ledger: &mut Ledger, user_id: Uuid, amount: i64) -> Result<(), Error> {
        let balance = ledger
            .balances
            .get_mut(&user_id)
            .ok_or_else(|| Error::NotFound(format!("wallet for user {}", user_id)))?;
        if *balance < amount {
            return Err(Error::InsufficientBalance {
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn mark_used_entry(
        &self,
        voucher_id: Uuid,
        used_at: DateTime<Utc>,
        used_in_order: Option<&str>,
    ) -> bool {
        match self.vouchers.get_mut(&voucher_id) {
            Some(mut v) if !v.is_used => {
                v.is_used = true;
                v.used_at = Some(used_at);
                v.used_in_order = used_in_order.map(String::from);
                true
            }
            _ => false,
        }
    }

    pub fn all_logs(&self) -> Vec<RedeemLog> {
        self.lock_logs().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepositories {
    async fn create(&self, user: &User) -> Result<(), Error> {
        self.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.clone()))
    }
}

#[async_trait]
impl WalletRepository for InMemoryRepositories {
    async fn create_wallet(&self, user_id: Uuid) -> Result<(), Error> {
        self.lock_ledger().balances.insert(user_id, 0);
        Ok(())
    }

    async fn get_balance(&self, user_id: Uuid) -> Result<i64, Error> {
        self.lock_ledger()
            .balances
            .get(&user_id)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("wallet for user {}", user_id)))
    }

    async fn apply_credit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: WalletEntryKind,
        reason: &str,
    ) -> Result<WalletHistoryEntry, Error> {
        let entry = WalletHistoryEntry::new(user_id, kind, amount, reason);
        let mut ledger = self.lock_ledger();
        let balance = ledger
            .balances
            .get_mut(&user_id)
            .ok_or_else(|| Error::NotFound(format!("wallet for user {}", user_id)))?;
        *balance += amount;
        ledger.history.push(entry.clone());
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
        let mut ledger = self.lock_ledger();
        Self::debit_locked(&mut ledger, user_id, amount)?;
        ledger.history.push(entry.clone());
        Ok(entry)
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletHistoryEntry>, Error> {
        let ledger = self.lock_ledger();
        let mut entries: Vec<_> = ledger
            .history
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn history_total(&self, user_id: Uuid) -> Result<i64, Error> {
        let ledger = self.lock_ledger();
        Ok(ledger
            .history
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.amount)
            .sum())
    }
}

#[async_trait]
impl VoucherTypeRepository for InMemoryRepositories {
    async fn create(&self, ty: &VoucherType) -> Result<(), Error> {
        self.voucher_types.insert(ty.voucher_type_id, ty.clone());
        Ok(())
    }

    async fn get(&self, voucher_type_id: Uuid) -> Result<Option<VoucherType>, Error> {
        Ok(self.voucher_types.get(&voucher_type_id).map(|t| t.clone()))
    }

    async fn list(&self, limit: i64) -> Result<Vec<VoucherType>, Error> {
        let mut all: Vec<_> = self.voucher_types.iter().map(|t| t.clone()).collect();
        all.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn update(&self, ty: &VoucherType) -> Result<(), Error> {
        self.voucher_types.insert(ty.voucher_type_id, ty.clone());
        Ok(())
    }
}

#[async_trait]
impl VoucherRepository for InMemoryRepositories {
    async fn create(&self, voucher: &Voucher) -> Result<(), Error> {
        self.vouchers.insert(voucher.voucher_id, voucher.clone());
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
        {
            let mut ledger = self.lock_ledger();
            Self::debit_locked(&mut ledger, voucher.user_id, cost)?;
            ledger.history.push(entry.clone());
        }
        self.vouchers.insert(voucher.voucher_id, voucher.clone());
        Ok(entry)
    }

    async fn get(&self, voucher_id: Uuid) -> Result<Option<Voucher>, Error> {
        Ok(self.vouchers.get(&voucher_id).map(|v| v.clone()))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Voucher>, Error> {
        Ok(self
            .vouchers
            .iter()
            .find(|v| v.code == code)
            .map(|v| v.clone()))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, Error> {
        Ok(self.vouchers.iter().any(|v| v.code == code))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Voucher>, Error> {
        let mut result: Vec<_> = self
            .vouchers
            .iter()
            .filter(|v| v.user_id == user_id)
            .map(|v| v.clone())
            .collect();
        result.sort_by_key(|v| std::cmp::Reverse(v.acquired_at));
        Ok(result)
    }

    async fn mark_used_and_log(
        &self,
        voucher_id: Uuid,
        used_at: DateTime<Utc>,
        used_in_order: Option<&str>,
        log: &RedeemLog,
    ) -> Result<bool, Error> {
        if !self.mark_used_entry(voucher_id, used_at, used_in_order) {
            return Ok(false);
        }
        self.lock_logs().push(log.clone());
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
        let consumed = match self.tokens.get_mut(&token_id) {
            Some(mut t)
                if t.consumed_at.is_none() && !t.is_revoked && t.expires_at >= used_at =>
            {
                t.consumed_at = Some(used_at);
                true
            }
            _ => false,
        };
        if !consumed {
            return Ok(false);
        }

        if !self.mark_used_entry(voucher_id, used_at, used_in_order) {
            // Undo the consume so the "transaction" leaves no trace.
            if let Some(mut t) = self.tokens.get_mut(&token_id) {
                t.consumed_at = None;
            }
            return Ok(false);
        }

        self.lock_logs().push(log.clone());
        Ok(true)
    }
}

#[async_trait]
impl EVoucherTokenRepository for InMemoryRepositories {
    async fn insert(&self, token: &EVoucherToken) -> Result<(), Error> {
        self.tokens.insert(token.token_id, token.clone());
        Ok(())
    }

    async fn get_by_value(&self, token_value: &str) -> Result<Option<EVoucherToken>, Error> {
        Ok(self
            .tokens
            .iter()
            .find(|t| t.token_value == token_value)
            .map(|t| t.clone()))
    }

    async fn revoke(&self, token_value: &str) -> Result<(), Error> {
        for mut t in self.tokens.iter_mut() {
            if t.token_value == token_value && t.consumed_at.is_none() {
                t.is_revoked = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RedeemLogRepository for InMemoryRepositories {
    async fn insert(&self, log: &RedeemLog) -> Result<(), Error> {
        self.lock_logs().push(log.clone());
        Ok(())
    }

    async fn list_for_voucher(
        &self,
        voucher_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RedeemLog>, Error> {
        let mut result: Vec<_> = self
            .lock_logs()
            .iter()
            .filter(|l| l.voucher_id == Some(voucher_id))
            .cloned()
            .collect();
        result.reverse();
        result.truncate(limit as usize);
        Ok(result)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<RedeemLog>, Error> {
        let mut result: Vec<_> = self
            .lock_logs()
            .iter()
            .filter(|l| l.user_id == Some(user_id))
            .cloned()
            .collect();
        result.reverse();
        result.truncate(limit as usize);
        Ok(result)
    }
}

#[async_trait]
impl PetRepository for InMemoryRepositories {
    async fn create(&self, pet: &Pet) -> Result<(), Error> {
        self.pets.insert(pet.pet_id, pet.clone());
        Ok(())
    }

    async fn get(&self, pet_id: Uuid) -> Result<Option<Pet>, Error> {
        Ok(self.pets.get(&pet_id).map(|p| p.clone()))
    }

    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Pet>, Error> {
        Ok(self
            .pets
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.clone()))
    }

    async fn update(&self, pet: &Pet) -> Result<(), Error> {
        match self.pets.get_mut(&pet.pet_id) {
            Some(mut slot) => {
                *slot = pet.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("pet {}", pet.pet_id))),
        }
    }
}

#[async_trait]
impl MiniGamePlayRepository for InMemoryRepositories {
    async fn record_completion(
        &self,
        play: &MiniGamePlay,
        pet: &Pet,
        credits: &[PointCredit],
        reward_voucher: Option<&Voucher>,
    ) -> Result<Vec<WalletHistoryEntry>, Error> {
        PetRepository::update(self, pet).await?;
        self.plays.insert(play.play_id, play.clone());

        let mut entries = Vec::new();
        {
            let mut ledger = self.lock_ledger();
            for credit in credits {
                let balance = ledger
                    .balances
                    .get_mut(&play.user_id)
                    .ok_or_else(|| Error::NotFound(format!("wallet for user {}", play.user_id)))?;
                *balance += credit.amount;
                let entry = WalletHistoryEntry::new(
                    play.user_id,
                    WalletEntryKind::Point,
                    credit.amount,
                    &credit.reason,
                );
                ledger.history.push(entry.clone());
                entries.push(entry);
            }
        }

        if let Some(voucher) = reward_voucher {
            self.vouchers.insert(voucher.voucher_id, voucher.clone());
        }

        Ok(entries)
    }

    async fn get(&self, play_id: Uuid) -> Result<Option<MiniGamePlay>, Error> {
        Ok(self.plays.get(&play_id).map(|p| p.clone()))
    }

    async fn list_for_pet(&self, pet_id: Uuid, limit: i64) -> Result<Vec<MiniGamePlay>, Error> {
        let mut result: Vec<_> = self
            .plays
            .iter()
            .filter(|p| p.pet_id == pet_id)
            .map(|p| p.clone())
            .collect();
        result.sort_by_key(|p| std::cmp::Reverse(p.started_at));
        result.truncate(limit as usize);
        Ok(result)
    }
}
