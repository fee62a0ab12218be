//! Deterministic random number generation for deck building.
//!
//! - **Deterministic**: the same seed produces the same deck
//! - **Context streams**: shuffling and random colors draw from independent
//!   streams, so adding a color to the palette does not reorder the deck
//! - **Stable**: context streams are keyed with `FxHasher`, whose output
//!   does not depend on the toolchain
//!
//! ```
//! use memory_match::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! let mut xs = [1, 2, 3, 4, 5, 6];
//! let mut ys = xs;
//! a.shuffle(&mut xs);
//! b.shuffle(&mut ys);
//! assert_eq!(xs, ys);
//! ```

use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;

use super::geometry::Rgba;

/// Seeded ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Uniform index in `lo..hi`.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Uniform float in `[0, 1)`.
    pub fn gen_unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniformly random opaque HSV color.
    pub fn gen_hsv_color(&mut self) -> Rgba {
        let h = self.gen_unit();
        let s = self.gen_unit();
        let v = self.gen_unit();
        Rgba::from_hsv(h, s, v)
    }

    /// Fisher–Yates shuffle: `for i in 0..n { j = uniform(i, n); swap(i, j) }`.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let n = slice.len();
        for i in 0..n {
            let j = self.gen_range_usize(i..n);
            slice.swap(i, j);
        }
    }
}
