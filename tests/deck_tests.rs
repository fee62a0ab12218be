//! Deck generation and layout integration tests.

use proptest::prelude::*;
use rustc_hash::FxHashMap;

use memory_match::cards::{grid_position, Deck};
use memory_match::core::{ConfigError, GameConfig, GameRng, GridSize, PairId, Rgba, MAX_GRID_SIDE};

fn identity_counts(deck: &Deck) -> FxHashMap<PairId, usize> {
    let mut counts = FxHashMap::default();
    for blueprint in deck.blueprints() {
        *counts.entry(blueprint.pair).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
// Generation
// =============================================================================

/// A 4x4 grid yields 16 cards over 8 identities, each used exactly twice.
#[test]
fn test_four_by_four_deck() {
    let config = GameConfig::default().with_grid(4, 4);
    let deck = Deck::for_config(&config).unwrap();

    assert_eq!(deck.len(), 16);
    let counts = identity_counts(&deck);
    assert_eq!(counts.len(), 8);
    assert!(counts.values().all(|&c| c == 2));
}

#[test]
fn test_same_seed_same_deck() {
    let config = GameConfig::default().with_grid(6, 4).with_seed(7);
    assert_eq!(Deck::for_config(&config).unwrap(), Deck::for_config(&config).unwrap());
}

#[test]
fn test_different_seed_different_order() {
    let a = Deck::for_config(&GameConfig::default().with_grid(6, 6).with_seed(1)).unwrap();
    let b = Deck::for_config(&GameConfig::default().with_grid(6, 6).with_seed(2)).unwrap();

    let order = |d: &Deck| d.blueprints().iter().map(|b| b.pair).collect::<Vec<_>>();
    assert_ne!(order(&a), order(&b));
}

#[test]
fn test_both_cards_of_a_pair_share_their_look() {
    let config = GameConfig::default()
        .with_grid(4, 3)
        .with_textures(["apple", "pear", "plum"])
        .with_colors(vec![Rgba::new(1.0, 0.0, 0.0, 1.0)]);
    let deck = Deck::for_config(&config).unwrap();

    let mut looks = FxHashMap::default();
    for blueprint in deck.blueprints() {
        let look = (blueprint.texture_index, blueprint.color);
        let first = *looks.entry(blueprint.pair).or_insert(look);
        assert_eq!(first, look);
    }
    assert!(deck.blueprints().iter().all(|b| b.texture_index.is_some_and(|t| t < 3)));
}

#[test]
fn test_no_textures_means_untextured_cards() {
    let deck = Deck::generate(2, 0, &[], &GameRng::new(3)).unwrap();
    assert!(deck.blueprints().iter().all(|b| b.texture_index.is_none()));
}

// =============================================================================
// Configuration errors
// =============================================================================

#[test]
fn test_odd_grid_rejected_before_dealing() {
    let config = GameConfig::default().with_grid(3, 3);
    assert!(matches!(
        Deck::for_config(&config),
        Err(ConfigError::OddCardCount { width: 3, height: 3 })
    ));
}

#[test]
fn test_missing_template_rejected() {
    let config = GameConfig::default().without_card_template();
    assert!(matches!(Deck::for_config(&config), Err(ConfigError::MissingCardTemplate)));
}

#[test]
fn test_zero_pairs_rejected() {
    assert!(matches!(
        Deck::generate(0, 1, &[], &GameRng::new(1)),
        Err(ConfigError::NoPairs)
    ));
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_layout_is_column_major_and_centered() {
    let grid = GridSize::new(2, 3);
    let deck = Deck::generate(3, 0, &[], &GameRng::new(1)).unwrap();
    let cards = deck.lay_out(grid, 2.0);

    // x outer, y inner: slot 1 is the second row of the first column.
    assert_eq!(cards[0].position.x, -1.0);
    assert_eq!(cards[0].position.z, -2.0);
    assert_eq!(cards[1].position.x, -1.0);
    assert_eq!(cards[1].position.z, 0.0);
    assert_eq!(cards[3].position.x, 1.0);
    assert_eq!(cards[3].position.z, -2.0);
    assert!(cards.iter().all(|c| c.position.y == 0.0));
    assert!(cards.iter().all(|c| !c.is_face_up() && !c.is_completed()));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_every_identity_twice(pairs in 1usize..80, palette in 0usize..10, seed in any::<u64>()) {
        let deck = Deck::generate(pairs, palette, &[], &GameRng::new(seed)).unwrap();
        prop_assert_eq!(deck.len(), pairs * 2);

        let counts = identity_counts(&deck);
        prop_assert_eq!(counts.len(), pairs);
        prop_assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn prop_resized_grid_is_always_playable(w in -50i64..50, h in -50i64..50) {
        let grid = GridSize::from_input(w, h);
        prop_assert!(grid.width >= 1 && grid.width <= MAX_GRID_SIDE);
        prop_assert!(grid.height >= 1 && grid.height <= MAX_GRID_SIDE);
        prop_assert_eq!(grid.total() % 2, 0);
        prop_assert!(grid.validate().is_ok());
    }

    #[test]
    fn prop_layout_positions_are_distinct(w in 1u32..8, h in 1u32..8) {
        let grid = GridSize::new(w, h);
        let positions: Vec<_> = (0..grid.total()).map(|i| grid_position(grid, 1.0, i)).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                prop_assert!(a != b);
            }
        }
    }
}
