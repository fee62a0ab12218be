//! Cards and deck generation.
//!
//! ## Key Types
//!
//! - `Card`: one grid cell (identity, look, settled face, completion)
//! - `Face`: which side is showing
//! - `Deck`: shuffled sequence of paired `CardBlueprint`s

pub mod deck;
pub mod instance;

pub use deck::{grid_position, CardBlueprint, Deck};
pub use instance::{Card, Face};
