//! The persisted session layout.
//!
//! ```text
//! SaveGame {
//!     score, gridWidth, gridHeight, cardSpacing, matchedPairs,
//!     cards: [CardRecord { pairToken, textureIndex, color, position, completed, faceUp }],
//! }
//! ```
//!
//! `textureIndex` is `-1` for untextured cards. `pairsNeededToWin` is not
//! stored; it is always half the card count.
//!
//! Pair tokens are opaque. A restored engine keeps the tokens it was loaded
//! with, so saving right after a resume writes the same records back.
//!
//! Only `completed` is authoritative across a restore. `faceUp` records the
//! settled face at checkpoint time, but a resumed session always runs the
//! preview and hides every card that is not completed.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use crate::cards::{Card, Face};
use crate::core::{CardRef, GridSize, PairId, PairIdAllocator, Rgba, Vec3};
use crate::engine::{EngineSettings, MatchEngine};

/// Texture index persisted for untextured cards.
pub const NO_TEXTURE: i32 = -1;

/// One card of a saved session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub pair_token: String,
    pub texture_index: i32,
    pub color: Rgba,
    pub position: Vec3,
    pub completed: bool,
    pub face_up: bool,
}

impl CardRecord {
    /// Record `card` under its default `pair-{n}` token.
    #[must_use]
    pub fn from_card(card: &Card) -> Self {
        Self::with_token(card, card.pair().token())
    }

    fn with_token(card: &Card, pair_token: String) -> Self {
        Self {
            pair_token,
            texture_index: card
                .texture_index
                .map_or(NO_TEXTURE, |i| i32::try_from(i).unwrap_or(NO_TEXTURE)),
            color: card.color,
            position: card.position,
            completed: card.is_completed(),
            face_up: card.is_face_up(),
        }
    }
}

/// Full snapshot of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGame {
    pub score: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub card_spacing: f32,
    pub matched_pairs: u32,
    pub cards: Vec<CardRecord>,
}

impl SaveGame {
    /// Snapshot the engine's current state.
    #[must_use]
    pub fn capture(engine: &MatchEngine) -> Self {
        let grid = engine.grid();
        Self {
            score: engine.score(),
            grid_width: grid.width,
            grid_height: grid.height,
            card_spacing: engine.card_spacing(),
            matched_pairs: engine.matched_pairs(),
            cards: engine
                .cards()
                .iter()
                .map(|card| CardRecord::with_token(card, engine.pair_token(card.pair())))
                .collect(),
        }
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        GridSize::new(self.grid_width, self.grid_height)
    }

    #[must_use]
    pub fn pairs_needed_to_win(&self) -> u32 {
        (self.cards.len() / 2) as u32
    }

    /// Check every structural invariant of a session.
    pub fn validate(&self) -> Result<(), DecodeError> {
        let total = self.cards.len();
        if total == 0 || total % 2 != 0 {
            return Err(DecodeError::corrupt(format!("{} cards cannot form pairs", total)));
        }
        if self.grid().total() != total {
            return Err(DecodeError::corrupt(format!(
                "grid {} does not hold {} cards",
                self.grid(),
                total
            )));
        }
        if !self.card_spacing.is_finite() || self.card_spacing <= 0.0 {
            return Err(DecodeError::corrupt(format!(
                "invalid card spacing {}",
                self.card_spacing
            )));
        }

        let mut pairs: FxHashMap<&str, (usize, bool)> = FxHashMap::default();
        for (slot, record) in self.cards.iter().enumerate() {
            if record.pair_token.is_empty() {
                return Err(DecodeError::corrupt(format!("card {} has no pair token", slot)));
            }
            if record.texture_index < NO_TEXTURE {
                return Err(DecodeError::corrupt(format!(
                    "card {} has texture index {}",
                    slot, record.texture_index
                )));
            }
            if !record.color.is_finite() || !record.position.is_finite() {
                return Err(DecodeError::corrupt(format!("card {} has non-finite values", slot)));
            }

            let entry = pairs
                .entry(record.pair_token.as_str())
                .or_insert((0, record.completed));
            entry.0 += 1;
            if entry.1 != record.completed {
                return Err(DecodeError::corrupt(format!(
                    "pair {} is only half completed",
                    record.pair_token
                )));
            }
        }

        if let Some((token, (count, _))) = pairs.iter().find(|(_, (count, _))| *count != 2) {
            return Err(DecodeError::corrupt(format!(
                "pair {} appears {} times",
                token, count
            )));
        }

        let completed_pairs = pairs.values().filter(|(_, completed)| *completed).count() as u32;
        if completed_pairs != self.matched_pairs {
            return Err(DecodeError::corrupt(format!(
                "{} matched pairs recorded but {} completed",
                self.matched_pairs, completed_pairs
            )));
        }

        // Every match adds the same amount, and a full board must fit in u32.
        let max_score = (u32::MAX / self.pairs_needed_to_win()).saturating_mul(self.matched_pairs);
        if self.score > max_score {
            return Err(DecodeError::corrupt(format!(
                "score {} is out of reach with {} matched pairs",
                self.score, self.matched_pairs
            )));
        }

        Ok(())
    }

    /// Rebuild cards from the records. Pair tokens are mapped to fresh
    /// identities in order of first appearance.
    pub fn to_cards(&self) -> Result<Vec<Card>, DecodeError> {
        self.rebuild().map(|(cards, _)| cards)
    }

    /// Rebuild an engine holding this session's progress.
    pub fn restore(&self, settings: EngineSettings) -> Result<MatchEngine, DecodeError> {
        let (cards, tokens) = self.rebuild()?;
        Ok(MatchEngine::with_progress(
            cards,
            self.grid(),
            self.card_spacing,
            settings,
            self.score,
            self.matched_pairs,
        )
        .with_pair_tokens(tokens))
    }

    fn rebuild(&self) -> Result<(Vec<Card>, FxHashMap<PairId, String>), DecodeError> {
        self.validate()?;

        let mut ids = PairIdAllocator::new();
        let mut by_token: FxHashMap<&str, PairId> = FxHashMap::default();

        let cards = self
            .cards
            .iter()
            .enumerate()
            .map(|(slot, record)| {
                let pair = *by_token
                    .entry(record.pair_token.as_str())
                    .or_insert_with(|| ids.issue());
                let texture_index = u32::try_from(record.texture_index).ok();

                Card::new(CardRef::new(slot as u32), pair)
                    .with_look(texture_index, record.color)
                    .at(record.position)
                    .with_progress(Face::from_up(record.face_up), record.completed)
            })
            .collect();

        let tokens = by_token
            .into_iter()
            .map(|(token, pair)| (pair, token.to_string()))
            .collect();

        Ok((cards, tokens))
    }
}
