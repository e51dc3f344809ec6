//! Error type shared by the storage layer and domain logic.
use thiserror::Error;

/// Unified error for request validation, storage, and serialization
/// failures. HTTP status mapping lives with the server.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Slug generation exhausted after {0} attempts")]
    SlugExhausted(u32),

    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Internal server error")]
    Internal,
}

// redb surfaces a distinct error type per operation stage; fold them all
// into the umbrella `redb::Error` behind `Database`.
macro_rules! from_redb {
    ($($source:ty),+ $(,)?) => {
        $(impl From<$source> for AppError {
            fn from(err: $source) -> Self {
                Self::Database(err.into())
            }
        })+
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
