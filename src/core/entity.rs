//! Card addressing and pair identity.
//!
//! Two distinct identifiers live on every card:
//!
//! - [`CardRef`]: the slot a card occupies on the board (`0..width*height`).
//!   The presenter uses it to report activations.
//! - [`PairId`]: the opaque identity shared by exactly two cards. Matching
//!   compares pair identities, never slots.
//!
//! Pair identities are issued by a [`PairIdAllocator`] from a monotonic
//! counter, so two pairs can never collide regardless of how the palette
//! is configured.
//!
//! ```
//! use memory_match::core::{CardRef, PairIdAllocator};
//!
//! let mut ids = PairIdAllocator::new();
//! let a = ids.issue();
//! let b = ids.issue();
//! assert_ne!(a, b);
//!
//! let slot = CardRef::new(3);
//! assert_eq!(slot.index(), 3);
//! ```

use serde::{Deserialize, Serialize};

/// Board slot of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardRef(pub u32);

impl CardRef {
    /// Create a card reference from a slot index.
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Slot index, usable for indexing the board.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for CardRef {
    fn from(slot: u32) -> Self {
        Self(slot)
    }
}

impl std::fmt::Display for CardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Opaque pair identity.
///
/// Equal for exactly two cards in a deck. The textual form (`pair-<n>`)
/// is what gets persisted as the pair token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub u64);

impl PairId {
    /// Get the raw counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Textual token used in save files.
    #[must_use]
    pub fn token(self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pair-{}", self.0)
    }
}

/// Issues fresh pair identities.
///
/// Identities are never derived from palette indices; each call to
/// [`issue`](Self::issue) returns a value no earlier call returned.
#[derive(Clone, Debug, Default)]
pub struct PairIdAllocator {
    next: u64,
}

impl PairIdAllocator {
    /// Create an allocator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identity.
    pub fn issue(&mut self) -> PairId {
        let id = PairId(self.next);
        self.next += 1;
        id
    }
}
