//! Card instances - runtime card state.
//!
//! A [`Card`] pairs immutable identity (slot, pair, presentation data) with
//! the two pieces of mutable state the engine drives:
//!
//! - `face`: the *settled* face, updated when a flip animation completes
//! - `completed`: set once the card's pair has been matched; a completed
//!   card never turns face-down again

use serde::{Deserialize, Serialize};

use crate::core::{CardRef, PairId, Rgba, Vec3};

/// Which side of a card is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    #[default]
    Down,
    Up,
}

impl Face {
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Face::Up)
    }

    #[must_use]
    pub const fn from_up(up: bool) -> Self {
        if up {
            Face::Up
        } else {
            Face::Down
        }
    }
}

/// A card on the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    slot: CardRef,
    pair: PairId,

    /// Index into the texture palette. `None` for untextured cards.
    pub texture_index: Option<u32>,

    pub color: Rgba,

    pub position: Vec3,

    face: Face,
    completed: bool,
}

impl Card {
    /// Create a face-down, unmatched card.
    #[must_use]
    pub fn new(slot: CardRef, pair: PairId) -> Self {
        Self {
            slot,
            pair,
            texture_index: None,
            color: Rgba::WHITE,
            position: Vec3::ZERO,
            face: Face::Down,
            completed: false,
        }
    }

    /// Set presentation data (builder pattern).
    #[must_use]
    pub fn with_look(mut self, texture_index: Option<u32>, color: Rgba) -> Self {
        self.texture_index = texture_index;
        self.color = color;
        self
    }

    /// Set the world position (builder pattern).
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the initial face and completion (used when restoring a save).
    ///
    /// A completed card is always face-up.
    #[must_use]
    pub fn with_progress(mut self, face: Face, completed: bool) -> Self {
        self.completed = completed;
        self.face = if completed { Face::Up } else { face };
        self
    }

    #[must_use]
    pub fn slot(&self) -> CardRef {
        self.slot
    }

    #[must_use]
    pub fn pair(&self) -> PairId {
        self.pair
    }

    #[must_use]
    pub fn face(&self) -> Face {
        self.face
    }

    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.face.is_up()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Check if two distinct cards form a pair.
    #[must_use]
    pub fn matches(&self, other: &Card) -> bool {
        self.slot != other.slot && self.pair == other.pair
    }

    /// Record a finished flip.
    ///
    /// Returns `false` (and changes nothing) when a completed card would
    /// turn face-down.
    pub fn settle(&mut self, face: Face) -> bool {
        if self.completed && face == Face::Down {
            return false;
        }
        self.face = face;
        true
    }

    /// Permanently resolve this card: face-up and completed.
    pub fn complete(&mut self) {
        self.completed = true;
        self.face = Face::Up;
    }
}
