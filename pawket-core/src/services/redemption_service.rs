// File: pawket-core/src/services/redemption_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use pawket_common::models::redeem::{EVoucherToken, RedeemLog, RedeemStatus};
use pawket_common::models::voucher::{Voucher, VoucherKind, VoucherType};
use pawket_common::traits::repository_traits::{
    EVoucherTokenRepository, RedeemLogRepository, VoucherRepository,
};

use crate::Error;
use crate::services::catalogue_service::CatalogueService;
use crate::services::codes::CodeGenerator;

#[derive(Debug, Clone)]
pub struct RedemptionConfig {
    /// Lifetime of a scan-to-redeem token.
    pub token_ttl: Duration,
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::minutes(5),
        }
    }
}

/// Validates and marks coupons/e-vouchers as used, directly or through a
/// short-lived single-use token. Every attempt, success or failure, leaves
/// a durable `RedeemLog` row; that is a user-visible audit requirement.
/// Redemption never refunds the issuance cost.
pub struct RedemptionService {
    voucher_repo: Arc<dyn VoucherRepository + Send + Sync>,
    token_repo: Arc<dyn EVoucherTokenRepository + Send + Sync>,
    log_repo: Arc<dyn RedeemLogRepository + Send + Sync>,
    catalogue: Arc<CatalogueService>,
    codes: Arc<CodeGenerator>,
    config: RedemptionConfig,
}

impl RedemptionService {
    pub fn new(
        voucher_repo: Arc<dyn VoucherRepository + Send + Sync>,
        token_repo: Arc<dyn EVoucherTokenRepository + Send + Sync>,
        log_repo: Arc<dyn RedeemLogRepository + Send + Sync>,
        catalogue: Arc<CatalogueService>,
        codes: Arc<CodeGenerator>,
        config: RedemptionConfig,
    ) -> Self {
        Self {
            voucher_repo,
            token_repo,
            log_repo,
            catalogue,
            codes,
            config,
        }
    }

    /// Marks `voucher_id` as used. The conditional `is_used = false` guard
    /// in storage means exactly one of two concurrent attempts succeeds.
    pub async fn redeem_direct(
        &self,
        voucher_id: Uuid,
        context: Option<&str>,
    ) -> Result<RedeemLog, Error> {
        let voucher = match self.voucher_repo.get(voucher_id).await? {
            Some(v) => v,
            None => {
                self.log_attempt(None, None, None, RedeemStatus::Rejected, context)
                    .await?;
                return Err(Error::NotFound(format!("voucher {}", voucher_id)));
            }
        };
        let ty = self.catalogue.get_type(voucher.voucher_type_id).await?;

        self.check_redeemable(&voucher, &ty, None, context).await?;

        let now = Utc::now();
        let log = RedeemLog::new(
            Some(voucher.voucher_id),
            None,
            Some(voucher.user_id),
            RedeemStatus::Approved,
            context,
        );
        if self
            .voucher_repo
            .mark_used_and_log(voucher.voucher_id, now, context, &log)
            .await?
        {
            info!("voucher {} redeemed (code {})", voucher.voucher_id, voucher.code);
            Ok(log)
        } else {
            // Lost the race to a concurrent redemption.
            warn!("voucher {} already used by a concurrent request", voucher_id);
            self.log_attempt(
                Some(voucher.voucher_id),
                None,
                Some(voucher.user_id),
                RedeemStatus::AlreadyUsed,
                context,
            )
            .await?;
            Err(Error::AlreadyUsed(voucher_id))
        }
    }

    /// Creates a single-use redemption token for an e-voucher, valid for
    /// `config.token_ttl` from now.
    pub async fn issue_token(&self, evoucher_id: Uuid) -> Result<EVoucherToken, Error> {
        let voucher = self
            .voucher_repo
            .get(evoucher_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("voucher {}", evoucher_id)))?;
        let ty = self.catalogue.get_type(voucher.voucher_type_id).await?;
        if ty.kind != VoucherKind::EVoucher {
            return Err(Error::NotFound(format!("e-voucher {}", evoucher_id)));
        }
        if voucher.is_used {
            return Err(Error::AlreadyUsed(evoucher_id));
        }

        let token = EVoucherToken::new(
            voucher.voucher_id,
            &self.codes.token_value(),
            self.config.token_ttl,
        );
        self.token_repo.insert(&token).await?;
        debug!(
            "issued redemption token for voucher {}, expires {}",
            voucher.voucher_id, token.expires_at
        );
        Ok(token)
    }

    /// Redeems through a presented token. A consumed token presents the
    /// same as an unknown one, so a replay is indistinguishable from a
    /// never-issued token.
    pub async fn redeem_by_token(
        &self,
        token_value: &str,
        context: Option<&str>,
    ) -> Result<RedeemLog, Error> {
        let now = Utc::now();

        let token = match self.token_repo.get_by_value(token_value).await? {
            Some(t) => t,
            None => {
                self.log_attempt(None, None, None, RedeemStatus::Rejected, context)
                    .await?;
                return Err(Error::TokenNotFound);
            }
        };
        if token.is_consumed() {
            self.log_attempt(
                Some(token.voucher_id),
                Some(token.token_id),
                None,
                RedeemStatus::Rejected,
                context,
            )
            .await?;
            return Err(Error::TokenNotFound);
        }
        if token.is_revoked {
            self.log_attempt(
                Some(token.voucher_id),
                Some(token.token_id),
                None,
                RedeemStatus::Revoked,
                context,
            )
            .await?;
            return Err(Error::TokenRevoked);
        }
        if token.is_expired(now) {
            self.log_attempt(
                Some(token.voucher_id),
                Some(token.token_id),
                None,
                RedeemStatus::Expired,
                context,
            )
            .await?;
            return Err(Error::TokenExpired);
        }

        let voucher = self
            .voucher_repo
            .get(token.voucher_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("voucher {}", token.voucher_id)))?;
        let ty = self.catalogue.get_type(voucher.voucher_type_id).await?;

        self.check_redeemable(&voucher, &ty, Some(token.token_id), context)
            .await?;

        let log = RedeemLog::new(
            Some(voucher.voucher_id),
            Some(token.token_id),
            Some(voucher.user_id),
            RedeemStatus::Approved,
            context,
        );
        if self
            .voucher_repo
            .consume_and_redeem(token.token_id, voucher.voucher_id, now, context, &log)
            .await?
        {
            info!(
                "voucher {} redeemed via token {}",
                voucher.voucher_id, token.token_id
            );
            Ok(log)
        } else {
            warn!(
                "token {} lost the redemption race for voucher {}",
                token.token_id, voucher.voucher_id
            );
            self.log_attempt(
                Some(voucher.voucher_id),
                Some(token.token_id),
                Some(voucher.user_id),
                RedeemStatus::AlreadyUsed,
                context,
            )
            .await?;
            Err(Error::AlreadyUsed(voucher.voucher_id))
        }
    }

    /// Idempotent: revoking an already-revoked or consumed token is a
    /// no-op.
    pub async fn revoke_token(&self, token_value: &str) -> Result<(), Error> {
        self.token_repo.revoke(token_value).await
    }

    /// Shared pre-checks for both redemption paths; failures are logged
    /// before the error propagates.
    async fn check_redeemable(
        &self,
        voucher: &Voucher,
        ty: &VoucherType,
        token_id: Option<Uuid>,
        context: Option<&str>,
    ) -> Result<(), Error> {
        if voucher.is_used {
            self.log_attempt(
                Some(voucher.voucher_id),
                token_id,
                Some(voucher.user_id),
                RedeemStatus::AlreadyUsed,
                context,
            )
            .await?;
            return Err(Error::AlreadyUsed(voucher.voucher_id));
        }
        if Utc::now() > ty.valid_to {
            self.log_attempt(
                Some(voucher.voucher_id),
                token_id,
                Some(voucher.user_id),
                RedeemStatus::Expired,
                context,
            )
            .await?;
            return Err(Error::Expired(voucher.voucher_id));
        }
        Ok(())
    }

    async fn log_attempt(
        &self,
        voucher_id: Option<Uuid>,
        token_id: Option<Uuid>,
        user_id: Option<Uuid>,
        status: RedeemStatus,
        context: Option<&str>,
    ) -> Result<RedeemLog, Error> {
        let log = RedeemLog::new(voucher_id, token_id, user_id, status, context);
        self.log_repo.insert(&log).await?;
        Ok(log)
    }
}
