// ================================================================
// File: pawket-common/src/error.rs
// ================================================================

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: i64, required: i64 },

    #[error("Voucher {0} already used")]
    AlreadyUsed(Uuid),

    #[error("Voucher {0} expired")]
    Expired(Uuid),

    #[error("Voucher type {0} is outside its validity window")]
    TypeExpired(Uuid),

    #[error("Redemption token expired")]
    TokenExpired,

    #[error("Redemption token revoked")]
    TokenRevoked,

    #[error("Redemption token not found")]
    TokenNotFound,

    #[error("Could not generate a unique voucher code")]
    CodeGenerationFailed,

    #[error("Pet {pet_id} does not belong to user {user_id}")]
    NotOwner { pet_id: Uuid, user_id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Parse(e.to_string())
    }
}
