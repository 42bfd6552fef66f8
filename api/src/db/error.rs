use thiserror::Error;

/// Errors produced by the record store and its repositories.
#[derive(Error, Debug)]
pub enum DbError {
    /// Creating, reading or writing the database file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file on disk is not a valid document, or the document failed to encode.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("that email is already in use")]
    EmailInUse,

    #[error("user not found")]
    UserNotFound,

    #[error("password does not match")]
    InvalidPassword,

    /// bcrypt only covers the first 72 bytes, so longer passwords are refused.
    #[error("password must be at most 72 bytes")]
    PasswordTooLong,

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// A blocking hash job panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience alias used throughout the store.
pub type Result<T> = std::result::Result<T, DbError>;
