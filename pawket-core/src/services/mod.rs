// File: src/services/mod.rs

pub mod catalogue_service;
pub mod codes;
pub mod issuance_service;
pub mod minigame_service;
pub mod pet_service;
pub mod redemption_service;
pub mod wallet_service;

pub use catalogue_service::CatalogueService;
pub use codes::{CodeConfig, CodeGenerator};
pub use issuance_service::IssuanceService;
pub use minigame_service::{MiniGameInputs, MiniGameRewardConfig, MiniGameService, MiniGameSession, PlayResult};
pub use pet_service::{PetService, ProgressionConfig};
pub use redemption_service::{RedemptionConfig, RedemptionService};
pub use wallet_service::WalletService;
