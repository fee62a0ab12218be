//! Configuration errors.
//!
//! Raised while validating a [`GameConfig`](super::GameConfig) or building a
//! deck. Every variant is fatal to session start: no card exists until the
//! configuration has been accepted.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid {width}x{height} holds an odd number of cards; the total must be even")]
    OddCardCount { width: u32, height: u32 },

    #[error("grid {width}x{height} holds no cards")]
    EmptyGrid { width: u32, height: u32 },

    #[error("no card template configured")]
    MissingCardTemplate,

    #[error("deck needs at least one pair")]
    NoPairs,

    #[error("pair identity {token} appears {count} times in the deck")]
    DuplicatePairIdentity { token: String, count: usize },

    #[error("card spacing must be finite and positive, got {0}")]
    InvalidSpacing(f32),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
