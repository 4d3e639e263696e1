// File: pawket-core/src/services/catalogue_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use pawket_common::models::voucher::VoucherType;
use pawket_common::traits::repository_traits::VoucherTypeRepository;

use crate::Error;

/// Read-mostly view over the coupon/e-voucher catalogue. Never mutates;
/// administrative corrections go through the repository directly.
pub struct CatalogueService {
    type_repo: Arc<dyn VoucherTypeRepository + Send + Sync>,
}

impl CatalogueService {
    pub fn new(type_repo: Arc<dyn VoucherTypeRepository + Send + Sync>) -> Self {
        Self { type_repo }
    }

    pub async fn get_type(&self, voucher_type_id: Uuid) -> Result<VoucherType, Error> {
        self.type_repo
            .get(voucher_type_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("voucher type {}", voucher_type_id)))
    }

    pub fn is_valid_now(&self, ty: &VoucherType, as_of: DateTime<Utc>) -> bool {
        ty.is_valid_at(as_of)
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<VoucherType>, Error> {
        self.type_repo.list(limit).await
    }
}
