//! Core types: identities, configuration, RNG, presentation values, errors.
//!
//! Everything here is independent of the match rules; the engine, deck
//! generator and persistence layers build on top of it.

pub mod entity;
pub mod rng;
pub mod config;
pub mod geometry;
pub mod error;

pub use entity::{CardRef, PairId, PairIdAllocator};
pub use rng::GameRng;
pub use config::{GameConfig, GridSize, Timings, DEFAULT_POINTS_PER_MATCH, MAX_GRID_SIDE};
pub use geometry::{Rgba, Vec3};
pub use error::ConfigError;
