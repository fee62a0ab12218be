//! # memory-match
//!
//! A headless match-pairs memory game: deal a shuffled grid of paired cards,
//! let the player reveal two at a time, score matches, and save/resume the
//! session between runs.
//!
//! ## Design Principles
//!
//! 1. **Engine as a value**: the match rules live in one owned
//!    [`MatchEngine`]. It never calls out; every transition returns the
//!    [`Effect`]s the host must perform.
//!
//! 2. **Explicit completions**: flip animations and delays are reported back
//!    with epoch-tagged tickets, so a continuation from an earlier game can
//!    never touch the current one.
//!
//! 3. **Validate, then construct**: configurations and save payloads are
//!    checked completely before any card exists.
//!
//! ## Modules
//!
//! - `core`: identities, configuration, RNG, colors and positions
//! - `cards`: cards and deck generation
//! - `engine`: the match-resolution state machine
//! - `persist`: save layout, codecs and save stores
//! - `session`: drives an engine with a presenter, a clock and a save slot

pub mod core;
pub mod cards;
pub mod engine;
pub mod persist;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    CardRef, PairId,
    GameConfig, GridSize, Timings,
    GameRng, Rgba, Vec3,
    ConfigError,
};

pub use crate::cards::{Card, Deck, Face};

pub use crate::engine::{Effect, EngineSettings, FlipRequest, FlipTicket, MatchEngine, SoundCue, TimerToken};

pub use crate::persist::{
    decode, encode,
    CardRecord, SaveGame, SaveFormat,
    SaveStore, FileSaveStore, MemorySaveStore,
    DecodeError, EncodeError, StoreError,
};

pub use crate::session::{
    FlipTiming, Presenter, NullPresenter, RecordingPresenter,
    Session, SessionError, StartKind,
};
