//! Deck generation.
//!
//! A deck is built in three steps:
//! 1. Issue `pair_count` fresh [`PairId`]s and give each a texture index
//!    (`i % palette_len`) and a color (explicit palette entry, or random HSV)
//! 2. Emit two blueprints per identity
//! 3. Fisher–Yates shuffle the whole sequence
//!
//! Texture and color live inside each blueprint, so the shuffle carries
//! them along with the identity they belong to.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::instance::Card;
use crate::core::error::{ConfigError, Result};
use crate::core::{CardRef, GameConfig, GameRng, GridSize, PairId, PairIdAllocator, Rgba, Vec3};

/// Identity and look of one card, before it is placed on the board.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardBlueprint {
    pub pair: PairId,
    pub texture_index: Option<u32>,
    pub color: Rgba,
}

/// Shuffled sequence of paired blueprints.
#[derive(Clone, Debug, PartialEq)]
pub struct Deck {
    blueprints: Vec<CardBlueprint>,
}

impl Deck {
    /// Generate a shuffled deck of `pair_count` pairs.
    ///
    /// Colors and shuffle order come from independent streams of `rng`, so
    /// the same seed always yields the same deck.
    pub fn generate(
        pair_count: usize,
        texture_palette_len: usize,
        colors: &[Rgba],
        rng: &GameRng,
    ) -> Result<Self> {
        if pair_count == 0 {
            return Err(ConfigError::NoPairs);
        }

        let mut color_rng = rng.for_context("colors");
        let mut ids = PairIdAllocator::new();
        let mut blueprints = Vec::with_capacity(pair_count * 2);

        for i in 0..pair_count {
            let texture_index = (texture_palette_len > 0).then(|| (i % texture_palette_len) as u32);
            let color = match colors.get(i) {
                Some(color) => *color,
                None => color_rng.gen_hsv_color(),
            };
            let blueprint = CardBlueprint {
                pair: ids.issue(),
                texture_index,
                color,
            };
            blueprints.push(blueprint);
            blueprints.push(blueprint);
        }

        rng.for_context("deck").shuffle(&mut blueprints);

        let deck = Self { blueprints };
        deck.verify_pairs()?;
        Ok(deck)
    }

    /// Validate `config` and generate the deck it describes.
    pub fn for_config(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        let rng = GameRng::new(config.seed);
        Self::generate(
            config.grid.pair_count(),
            config.textures.len(),
            &config.colors,
            &rng,
        )
    }

    /// Check that every identity appears in exactly two slots.
    pub fn verify_pairs(&self) -> Result<()> {
        let mut counts: FxHashMap<PairId, usize> = FxHashMap::default();
        for blueprint in &self.blueprints {
            *counts.entry(blueprint.pair).or_insert(0) += 1;
        }

        match counts.into_iter().find(|&(_, count)| count != 2) {
            Some((pair, count)) => Err(ConfigError::DuplicatePairIdentity {
                token: pair.token(),
                count,
            }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.blueprints.len() / 2
    }

    #[must_use]
    pub fn blueprints(&self) -> &[CardBlueprint] {
        &self.blueprints
    }

    /// Place the deck on a grid, producing face-down cards.
    ///
    /// Slots are assigned column by column (`x` outer, `y` inner) and the
    /// grid is centered on the origin in the XZ plane.
    #[must_use]
    pub fn lay_out(&self, grid: GridSize, spacing: f32) -> Vec<Card> {
        self.blueprints
            .iter()
            .enumerate()
            .map(|(index, blueprint)| {
                Card::new(CardRef::new(index as u32), blueprint.pair)
                    .with_look(blueprint.texture_index, blueprint.color)
                    .at(grid_position(grid, spacing, index))
            })
            .collect()
    }
}

/// World position of slot `index` on a centered grid.
#[must_use]
pub fn grid_position(grid: GridSize, spacing: f32, index: usize) -> Vec3 {
    let height = grid.height.max(1) as usize;
    let x = (index / height) as f32;
    let y = (index % height) as f32;
    let center_x = (grid.width.saturating_sub(1)) as f32 * spacing * 0.5;
    let center_y = (grid.height.saturating_sub(1)) as f32 * spacing * 0.5;

    Vec3::new(x * spacing - center_x, 0.0, y * spacing - center_y)
}
