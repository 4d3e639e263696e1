// File: pawket-core/src/repositories/mod.rs

pub mod postgres;

pub use pawket_common::traits::repository_traits::{
    EVoucherTokenRepository, MiniGamePlayRepository, PetRepository, RedeemLogRepository,
    UserRepository, VoucherRepository, VoucherTypeRepository, WalletRepository,
};
