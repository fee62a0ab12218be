//! Game configuration types.
//!
//! The host supplies a [`GameConfig`] at session start:
//! - [`GridSize`]: board dimensions (total must be even)
//! - [`Timings`]: preview and flip durations
//! - Palettes: texture keys and explicit pair colors
//! - Scoring and the RNG seed
//!
//! Configs are plain serde values and can be loaded from RON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, Result};
use super::geometry::Rgba;

/// Largest accepted grid side when deriving a grid from user input.
pub const MAX_GRID_SIDE: u32 = 12;

/// Default points awarded for each matched pair.
pub const DEFAULT_POINTS_PER_MATCH: u32 = 10;

/// Board dimensions in cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of cards on the board.
    #[must_use]
    pub const fn total(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of pairs the board holds.
    #[must_use]
    pub const fn pair_count(self) -> usize {
        self.total() / 2
    }

    /// Check that the grid holds a non-zero, even number of cards.
    pub fn validate(self) -> Result<()> {
        if self.total() == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.total() % 2 != 0 {
            return Err(ConfigError::OddCardCount {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Derive a valid grid from raw user input.
    ///
    /// Each side is clamped to `[1, MAX_GRID_SIDE]`. When the product is odd
    /// the height moves by one (up, or down at the upper bound) so the
    /// board always holds whole pairs.
    #[must_use]
    pub fn from_input(width: i64, height: i64) -> Self {
        let clamp = |v: i64| v.clamp(1, i64::from(MAX_GRID_SIDE)) as u32;
        let width = clamp(width);
        let mut height = clamp(height);

        if (width * height) % 2 != 0 {
            height = if height < MAX_GRID_SIDE { height + 1 } else { height - 1 };
        }
        Self { width, height }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fixed delays of the game loop, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// How long every card stays revealed at session start or resume.
    pub start_preview_ms: u64,

    /// How long a revealed pair stays up before it is evaluated.
    pub pair_preview_ms: u64,

    /// Duration of one flip animation when the session times flips itself.
    pub flip_ms: u64,
}

impl Timings {
    #[must_use]
    pub fn start_preview(&self) -> Duration {
        Duration::from_millis(self.start_preview_ms)
    }

    #[must_use]
    pub fn pair_preview(&self) -> Duration {
        Duration::from_millis(self.pair_preview_ms)
    }

    #[must_use]
    pub fn flip(&self) -> Duration {
        Duration::from_millis(self.flip_ms)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            start_preview_ms: 2_000,
            pair_preview_ms: 1_000,
            flip_ms: 300,
        }
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board dimensions.
    pub grid: GridSize,

    /// Distance between neighbouring card centers.
    pub card_spacing: f32,

    /// Presentation template the host instantiates for each card.
    /// `None` means the host has nothing to spawn.
    pub card_template: Option<String>,

    /// Texture keys. Pair `i` uses texture `i % len`; empty means untextured.
    pub textures: Vec<String>,

    /// Explicit colors for the first pairs; later pairs get random colors.
    pub colors: Vec<Rgba>,

    /// Preview and animation delays.
    pub timings: Timings,

    /// Points awarded per matched pair.
    pub points_per_match: u32,

    /// Seed for shuffling and random colors.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            card_spacing: 1.0,
            card_template: Some("card".to_string()),
            textures: Vec::new(),
            colors: Vec::new(),
            timings: Timings::default(),
            points_per_match: DEFAULT_POINTS_PER_MATCH,
            seed: 42,
        }
    }
}

impl GameConfig {
    /// Set the grid size.
    #[must_use]
    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.grid = GridSize::new(width, height);
        self
    }

    /// Set the card spacing.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.card_spacing = spacing;
        self
    }

    /// Set the texture palette.
    #[must_use]
    pub fn with_textures<I, S>(mut self, textures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.textures = textures.into_iter().map(Into::into).collect();
        self
    }

    /// Set the explicit color palette.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Rgba>) -> Self {
        self.colors = colors;
        self
    }

    /// Set the delays.
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Set points per match.
    #[must_use]
    pub fn with_points_per_match(mut self, points: u32) -> Self {
        self.points_per_match = points;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Remove the card template (the host has nothing to spawn).
    #[must_use]
    pub fn without_card_template(mut self) -> Self {
        self.card_template = None;
        self
    }

    /// Check everything session start depends on.
    pub fn validate(&self) -> Result<()> {
        if self.card_template.is_none() {
            return Err(ConfigError::MissingCardTemplate);
        }
        self.grid.validate()?;
        if !self.card_spacing.is_finite() || self.card_spacing <= 0.0 {
            return Err(ConfigError::InvalidSpacing(self.card_spacing));
        }
        Ok(())
    }

    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a config from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}
