use thiserror::Error;

use crate::core::ConfigError;
use crate::persist::{DecodeError, EncodeError, StoreError};

/// Errors surfaced by [`Session`](super::Session) calls.
///
/// Failures during automatic checkpoints are logged rather than returned;
/// only explicit calls report them.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
