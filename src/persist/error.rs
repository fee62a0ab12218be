//! Error types raised by the persistence layer.

use thiserror::Error;

/// A payload could not be turned back into a session.
///
/// Decoding builds a fresh value and validates it completely before
/// returning, so a failure never leaves partially restored state behind.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("corrupt save data: {0}")]
    Corrupt(String),
}

impl DecodeError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::Corrupt(reason.into())
    }
}

/// A snapshot could not be serialized.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Errors surfaced by save stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("save store lock was poisoned")]
    LockPoisoned,

    #[error("no platform data directory available")]
    NoDataDirectory,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
