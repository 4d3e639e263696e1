// File: pawket-common/src/models/mod.rs
pub mod minigame;
pub mod pet;
pub mod redeem;
pub mod user;
pub mod voucher;
pub mod wallet;

pub use minigame::{MiniGameOutcome, MiniGamePlay};
pub use pet::{Pet, StatDeltas};
pub use redeem::{EVoucherToken, RedeemLog, RedeemStatus};
pub use user::User;
pub use voucher::{DiscountKind, Voucher, VoucherKind, VoucherType};
pub use wallet::{PointCredit, WalletBalance, WalletEntryKind, WalletHistoryEntry};
