// File: pawket-core/src/test_utils/stack.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use pawket_common::error::Error;
use pawket_common::models::pet::Pet;
use pawket_common::models::user::User;
use pawket_common::models::voucher::{DiscountKind, VoucherKind, VoucherType};
use pawket_common::traits::repository_traits::{
    PetRepository, UserRepository, VoucherTypeRepository, WalletRepository,
};

use crate::services::{
    CatalogueService, CodeConfig, CodeGenerator, IssuanceService, MiniGameRewardConfig,
    MiniGameService, PetService, ProgressionConfig, RedemptionConfig, RedemptionService,
    WalletService,
};
use crate::test_utils::init_tracing;
use crate::test_utils::memory::InMemoryRepositories;

/// The full service stack wired over in-memory repositories, for tests.
pub struct TestStack {
    pub repos: Arc<InMemoryRepositories>,
    pub wallet: Arc<WalletService>,
    pub catalogue: Arc<CatalogueService>,
    pub issuance: Arc<IssuanceService>,
    pub redemption: Arc<RedemptionService>,
    pub pets: Arc<PetService>,
    pub minigame: Arc<MiniGameService>,
}

impl TestStack {
    pub fn new() -> Self {
        Self::with_rewards(MiniGameRewardConfig::default())
    }

    pub fn with_rewards(rewards: MiniGameRewardConfig) -> Self {
        init_tracing();

        let repos = Arc::new(InMemoryRepositories::new());
        let codes = Arc::new(CodeGenerator::with_seed(CodeConfig::default(), 0xBADC0DE));

        let wallet = Arc::new(WalletService::new(repos.clone()));
        let catalogue = Arc::new(CatalogueService::new(repos.clone()));
        let issuance = Arc::new(IssuanceService::new(
            catalogue.clone(),
            repos.clone(),
            codes.clone(),
        ));
        let redemption = Arc::new(RedemptionService::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
            catalogue.clone(),
            codes.clone(),
            RedemptionConfig::default(),
        ));
        let pets = Arc::new(PetService::new(
            repos.clone(),
            wallet.clone(),
            ProgressionConfig::default(),
        ));
        let minigame = Arc::new(MiniGameService::new(
            repos.clone(),
            repos.clone(),
            issuance.clone(),
            rewards,
            ProgressionConfig::default(),
        ));

        Self {
            repos,
            wallet,
            catalogue,
            issuance,
            redemption,
            pets,
            minigame,
        }
    }

    /// Creates a user with a wallet seeded to `points`.
    pub async fn user_with_points(&self, points: i64) -> Result<User, Error> {
        let user = User::new(&format!("user-{}", Uuid::new_v4()), "hash");
        UserRepository::create(&*self.repos, &user).await?;
        WalletRepository::create_wallet(&*self.repos, user.user_id).await?;
        if points > 0 {
            self.wallet.credit(user.user_id, points, "seed").await?;
        }
        Ok(user)
    }

    /// Creates a voucher type valid for thirty days either side of now.
    pub async fn voucher_type(&self, kind: VoucherKind, cost: i64) -> Result<VoucherType, Error> {
        self.voucher_type_with_window(
            kind,
            cost,
            Utc::now() - Duration::days(30),
            Utc::now() + Duration::days(30),
        )
        .await
    }

    /// Like `voucher_type` but with a caller-chosen id, for wiring a
    /// reward config before the stack exists.
    pub async fn voucher_type_with_id(
        &self,
        voucher_type_id: Uuid,
        kind: VoucherKind,
        cost: i64,
    ) -> Result<VoucherType, Error> {
        let mut ty = self.voucher_type(kind, cost).await?;
        ty.voucher_type_id = voucher_type_id;
        VoucherTypeRepository::create(&*self.repos, &ty).await?;
        Ok(ty)
    }

    pub async fn voucher_type_with_window(
        &self,
        kind: VoucherKind,
        cost: i64,
        valid_from: chrono::DateTime<Utc>,
        valid_to: chrono::DateTime<Utc>,
    ) -> Result<VoucherType, Error> {
        let now = Utc::now();
        let ty = VoucherType {
            voucher_type_id: Uuid::new_v4(),
            kind,
            name: format!("{} special", kind),
            discount_kind: DiscountKind::Flat,
            discount_value: 50,
            min_spend: 0,
            points_cost: cost,
            valid_from,
            valid_to,
            created_at: now,
            updated_at: now,
        };
        VoucherTypeRepository::create(&*self.repos, &ty).await?;
        Ok(ty)
    }

    /// Creates and persists a pet at a given level/experience.
    pub async fn pet_at(&self, user_id: Uuid, level: i32, experience: i64) -> Result<Pet, Error> {
        let mut pet = Pet::new(user_id, "nibbles");
        pet.level = level;
        pet.experience = experience;
        PetRepository::create(&*self.repos, &pet).await?;
        Ok(pet)
    }
}

impl Default for TestStack {
    fn default() -> Self {
        Self::new()
    }
}
