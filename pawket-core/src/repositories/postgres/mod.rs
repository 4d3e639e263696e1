// File: pawket-core/src/repositories/postgres/mod.rs

pub mod evoucher_tokens;
pub mod minigame_plays;
pub mod pets;
pub mod redeem_logs;
pub mod user;
pub mod voucher_types;
pub mod vouchers;
pub mod wallet;

pub use evoucher_tokens::PostgresEVoucherTokenRepository;
pub use minigame_plays::PostgresMiniGamePlayRepository;
pub use pets::PostgresPetRepository;
pub use redeem_logs::PostgresRedeemLogRepository;
pub use user::PostgresUserRepository;
pub use voucher_types::PostgresVoucherTypeRepository;
pub use vouchers::PostgresVoucherRepository;
pub use wallet::PostgresWalletRepository;
