// File: pawket-core/src/services/issuance_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use pawket_common::models::voucher::{Voucher, VoucherKind, VoucherType};
use pawket_common::models::wallet::WalletEntryKind;
use pawket_common::traits::repository_traits::VoucherRepository;

use crate::Error;
use crate::services::catalogue_service::CatalogueService;
use crate::services::codes::CodeGenerator;

const MAX_CODE_ATTEMPTS: u32 = 5;

/// Mints coupon/e-voucher instances for users. Purchases debit the wallet
/// and insert the instance in one storage transaction; a debit without a
/// voucher is never observable.
pub struct IssuanceService {
    catalogue: Arc<CatalogueService>,
    voucher_repo: Arc<dyn VoucherRepository + Send + Sync>,
    codes: Arc<CodeGenerator>,
}

impl IssuanceService {
    pub fn new(
        catalogue: Arc<CatalogueService>,
        voucher_repo: Arc<dyn VoucherRepository + Send + Sync>,
        codes: Arc<CodeGenerator>,
    ) -> Self {
        Self {
            catalogue,
            voucher_repo,
            codes,
        }
    }

    /// Builds an unpersisted instance of `type_id` for `user_id` with a
    /// collision-checked unique code, after validating the type. Callers
    /// that need the insert inside their own transaction (minigame
    /// rewards) persist it themselves; everyone else uses `issue`/`grant`.
    pub async fn mint(
        &self,
        user_id: Uuid,
        voucher_type_id: Uuid,
    ) -> Result<(Voucher, VoucherType), Error> {
        let ty = self.catalogue.get_type(voucher_type_id).await?;
        if !ty.is_valid_at(Utc::now()) {
            return Err(Error::TypeExpired(voucher_type_id));
        }
        let code = self.unique_code(ty.kind).await?;
        Ok((Voucher::new(user_id, voucher_type_id, &code), ty))
    }

    /// Purchase path: debits `points_cost` and persists the instance
    /// atomically. Propagates `InsufficientBalance` from the wallet guard.
    pub async fn issue(&self, user_id: Uuid, voucher_type_id: Uuid) -> Result<Voucher, Error> {
        let (voucher, ty) = self.mint(user_id, voucher_type_id).await?;
        let entry_kind = match ty.kind {
            VoucherKind::Coupon => WalletEntryKind::Coupon,
            VoucherKind::EVoucher => WalletEntryKind::EVoucher,
        };
        let reason = format!("coupon purchase: {}", ty.name);
        self.voucher_repo
            .create_with_debit(&voucher, entry_kind, ty.points_cost, &reason)
            .await?;

        info!(
            "issued {} '{}' (code {}) to user {} for {} points",
            ty.kind, ty.name, voucher.code, user_id, ty.points_cost
        );
        Ok(voucher)
    }

    /// Free-of-charge issuance (reward grants). No wallet mutation.
    pub async fn grant(&self, user_id: Uuid, voucher_type_id: Uuid) -> Result<Voucher, Error> {
        let (voucher, ty) = self.mint(user_id, voucher_type_id).await?;
        self.voucher_repo.create(&voucher).await?;
        info!(
            "granted {} '{}' (code {}) to user {}",
            ty.kind, ty.name, voucher.code, user_id
        );
        Ok(voucher)
    }

    async fn unique_code(&self, kind: VoucherKind) -> Result<String, Error> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.codes.voucher_code(kind);
            if !self.voucher_repo.code_exists(&code).await? {
                return Ok(code);
            }
            warn!("voucher code collision on '{}', regenerating", code);
        }
        Err(Error::CodeGenerationFailed)
    }
}
