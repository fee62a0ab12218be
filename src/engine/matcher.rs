//! The match-resolution state machine.
//!
//! ## Turn states
//!
//! ```text
//! Idle ──activate(a)──▶ OneSelected(a) ──activate(a)──▶ Idle      (deselect)
//!                             │
//!                             └─activate(b)──▶ Idle + pair (a,b) enqueued
//! ```
//!
//! ## Pair lifecycle
//!
//! Each enqueued pair moves independently through
//! `Revealing → Previewing → (matched | FlippingBack) → removed`:
//!
//! - `Revealing`: waits until both cards have settled face-up
//! - `Previewing`: waits for the pair preview timer, then compares identities
//! - `FlippingBack`: a mismatch waits for *both* flip-down completions
//!
//! Several pairs can be in the processing set at once. A card that belongs
//! to a pending pair cannot be activated until its pair is removed.
//!
//! ## Preview
//!
//! `begin_preview` locks input, reveals every card, holds for the start
//! preview delay, hides every card that is not completed, then unlocks.

use std::time::Duration;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use super::effect::{Effect, FlipTicket, SoundCue, TimerToken};
use super::flips::{FlipOutcome, FlipTracker, PairKey, Waiter};
use crate::cards::{Card, Face};
use crate::core::{CardRef, GameConfig, GridSize, PairId, DEFAULT_POINTS_PER_MATCH};

/// Scoring and delays used by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub points_per_match: u32,
    pub pair_preview: Duration,
    pub start_preview: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

impl From<&GameConfig> for EngineSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            points_per_match: config.points_per_match,
            pair_preview: config.timings.pair_preview(),
            start_preview: config.timings.start_preview(),
        }
    }
}

impl EngineSettings {
    /// Settings with zero delays and the default score.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            points_per_match: DEFAULT_POINTS_PER_MATCH,
            pair_preview: Duration::ZERO,
            start_preview: Duration::ZERO,
        }
    }
}

/// The current turn's selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Idle,
    OneSelected(CardRef),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PairStage {
    Revealing { outstanding: u8 },
    Previewing(TimerToken),
    FlippingBack { outstanding: u8 },
}

#[derive(Clone, Debug)]
struct PendingPair {
    key: PairKey,
    first: CardRef,
    second: CardRef,
    stage: PairStage,
}

impl PendingPair {
    fn contains(&self, card: CardRef) -> bool {
        self.first == card || self.second == card
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PreviewStage {
    Revealing { outstanding: usize },
    Holding,
    Hiding { outstanding: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Previewing(PreviewStage),
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerOwner {
    Pair(PairKey),
    Preview,
}

/// Owns the board, the processing set and the score.
///
/// Every mutation happens inside one of the three entry points
/// ([`activate`](Self::activate), [`flip_completed`](Self::flip_completed),
/// [`timer_elapsed`](Self::timer_elapsed)) or [`begin_preview`](Self::begin_preview).
/// Each returns the effects the caller must perform.
#[derive(Clone, Debug)]
pub struct MatchEngine {
    cards: im::Vector<Card>,
    grid: GridSize,
    card_spacing: f32,
    settings: EngineSettings,

    score: u32,
    matched_pairs: u32,
    pairs_needed: u32,
    pair_tokens: FxHashMap<PairId, String>,

    selection: Selection,
    processing: SmallVec<[PendingPair; 4]>,
    flips: FlipTracker,
    timers: FxHashMap<TimerToken, TimerOwner>,
    next_timer: u32,
    next_pair: u32,
    epoch: u32,

    phase: Phase,
    complete_emitted: bool,
    outbox: Vec<Effect>,
}

impl MatchEngine {
    /// Create an engine for a fresh board.
    ///
    /// Input is accepted immediately; call [`begin_preview`](Self::begin_preview)
    /// to run the reveal-then-hide preview first.
    #[must_use]
    pub fn new(cards: Vec<Card>, grid: GridSize, card_spacing: f32, settings: EngineSettings) -> Self {
        Self::with_progress(cards, grid, card_spacing, settings, 0, 0)
    }

    /// Create an engine for a board with existing progress (a restored save).
    #[must_use]
    pub fn with_progress(
        cards: Vec<Card>,
        grid: GridSize,
        card_spacing: f32,
        settings: EngineSettings,
        score: u32,
        matched_pairs: u32,
    ) -> Self {
        let pairs_needed = (cards.len() / 2) as u32;
        Self {
            cards: cards.into_iter().collect(),
            grid,
            card_spacing,
            settings,
            score,
            matched_pairs,
            pairs_needed,
            pair_tokens: FxHashMap::default(),
            selection: Selection::Idle,
            processing: SmallVec::new(),
            flips: FlipTracker::new(0),
            timers: FxHashMap::default(),
            next_timer: 0,
            next_pair: 0,
            epoch: 0,
            phase: Phase::Playing,
            complete_emitted: false,
            outbox: Vec::new(),
        }
    }

    /// Tag every ticket and timer of this engine with `epoch`.
    ///
    /// Call before any transition. Completions carrying a different epoch
    /// are ignored.
    #[must_use]
    pub fn with_epoch(mut self, epoch: u32) -> Self {
        self.epoch = epoch;
        self.flips = FlipTracker::new(epoch);
        self
    }

    /// Keep the persisted token of each restored identity, so later
    /// checkpoints write the tokens they were loaded with.
    #[must_use]
    pub fn with_pair_tokens(mut self, tokens: FxHashMap<PairId, String>) -> Self {
        self.pair_tokens = tokens;
        self
    }

    // === Queries ===

    #[must_use]
    pub fn cards(&self) -> &im::Vector<Card> {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, card: CardRef) -> Option<&Card> {
        self.cards.get(card.index())
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    #[must_use]
    pub fn card_spacing(&self) -> f32 {
        self.card_spacing
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Persisted token for `pair`.
    #[must_use]
    pub fn pair_token(&self, pair: PairId) -> String {
        self.pair_tokens
            .get(&pair)
            .cloned()
            .unwrap_or_else(|| pair.token())
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    #[must_use]
    pub fn pairs_needed(&self) -> u32 {
        self.pairs_needed
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Number of pairs awaiting resolution.
    #[must_use]
    pub fn processing_len(&self) -> usize {
        self.processing.len()
    }

    /// True when `card` belongs to a pair awaiting resolution.
    #[must_use]
    pub fn is_processing(&self, card: CardRef) -> bool {
        self.processing.iter().any(|p| p.contains(card))
    }

    /// Number of flip animations in flight.
    #[must_use]
    pub fn flips_in_flight(&self) -> usize {
        self.flips.in_flight()
    }

    /// True when `card` has a flip animation in flight.
    #[must_use]
    pub fn is_flipping(&self, card: CardRef) -> bool {
        self.flips.is_flipping(card)
    }

    /// True while the preview runs or after the game is complete.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.phase != Phase::Playing
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// True when no pair, selection, flip or timer is outstanding.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.processing.is_empty()
            && self.selection == Selection::Idle
            && self.flips.in_flight() == 0
            && self.timers.is_empty()
    }

    /// Guard for player input.
    #[must_use]
    pub fn can_activate(&self, card: CardRef) -> bool {
        self.phase == Phase::Playing
            && self.card(card).is_some_and(|c| !c.is_completed())
            && !self.is_processing(card)
    }

    // === Transitions ===

    /// Player activated `card`. Ineligible activations change nothing.
    pub fn activate(&mut self, card: CardRef) -> Vec<Effect> {
        if !self.can_activate(card) {
            trace!("ignoring activation of {}", card);
            return Vec::new();
        }

        match self.selection {
            Selection::Idle => {
                debug!("selected {}", card);
                self.selection = Selection::OneSelected(card);
                self.flip(card, Face::Up, None);
                self.outbox.push(Effect::Sound(SoundCue::Flip));
            }
            Selection::OneSelected(first) if first == card => {
                debug!("deselected {}", card);
                self.selection = Selection::Idle;
                self.flip(card, Face::Down, None);
                self.outbox.push(Effect::Sound(SoundCue::Flip));
            }
            Selection::OneSelected(first) => {
                self.selection = Selection::Idle;
                self.enqueue_pair(first, card);
                self.outbox.push(Effect::Sound(SoundCue::Flip));
            }
        }

        std::mem::take(&mut self.outbox)
    }

    /// The presenter finished the flip identified by `ticket`.
    pub fn flip_completed(&mut self, ticket: FlipTicket) -> Vec<Effect> {
        let Some(done) = self.flips.complete(ticket) else {
            debug!("ignoring stale or duplicate {}", ticket);
            return Vec::new();
        };

        if done.is_latest {
            if let Some(card) = self.cards.get_mut(done.card.index()) {
                card.settle(done.face);
            }
        }

        for waiter in done.waiters {
            match waiter {
                Waiter::Pair(key) => self.pair_flip_done(key),
                Waiter::Preview => self.preview_flip_done(),
            }
        }

        std::mem::take(&mut self.outbox)
    }

    /// A timer requested through [`Effect::Schedule`] has elapsed.
    pub fn timer_elapsed(&mut self, token: TimerToken) -> Vec<Effect> {
        if token.epoch != self.epoch {
            debug!("ignoring {} from an earlier session", token);
            return Vec::new();
        }
        let Some(owner) = self.timers.remove(&token) else {
            debug!("ignoring unknown {}", token);
            return Vec::new();
        };

        match owner {
            TimerOwner::Pair(key) => self.resolve_pair(key),
            TimerOwner::Preview => self.preview_hide(),
        }

        std::mem::take(&mut self.outbox)
    }

    /// Lock input and run the reveal/hold/hide preview.
    pub fn begin_preview(&mut self) -> Vec<Effect> {
        info!(cards = self.cards.len(), "starting preview");
        self.selection = Selection::Idle;

        let mut outstanding = 0;
        for index in 0..self.cards.len() {
            if self.flip(CardRef::new(index as u32), Face::Up, Some(Waiter::Preview)).is_pending() {
                outstanding += 1;
            }
        }

        self.phase = Phase::Previewing(PreviewStage::Revealing { outstanding });
        if outstanding == 0 {
            self.preview_hold();
        }

        std::mem::take(&mut self.outbox)
    }

    // === Internals ===

    fn flip(&mut self, card: CardRef, face: Face, waiter: Option<Waiter>) -> FlipOutcome {
        let Some(target) = self.cards.get(card.index()) else {
            return FlipOutcome::Settled;
        };
        let outcome = self.flips.request(target, face, waiter);
        if let FlipOutcome::Requested(request) = outcome {
            self.outbox.push(Effect::Flip(request));
        }
        outcome
    }

    fn schedule(&mut self, owner: TimerOwner, after: Duration) -> TimerToken {
        let token = TimerToken {
            epoch: self.epoch,
            seq: self.next_timer,
        };
        self.next_timer += 1;
        self.timers.insert(token, owner);
        self.outbox.push(Effect::Schedule { timer: token, after });
        token
    }

    fn pair_index(&self, key: PairKey) -> Option<usize> {
        self.processing.iter().position(|p| p.key == key)
    }

    fn enqueue_pair(&mut self, first: CardRef, second: CardRef) {
        let key = PairKey(self.next_pair);
        self.next_pair += 1;
        debug!("pair {:?} enqueued: {} + {}", key, first, second);

        let mut outstanding = 0;
        for card in [first, second] {
            if self.flip(card, Face::Up, Some(Waiter::Pair(key))).is_pending() {
                outstanding += 1;
            }
        }

        self.processing.push(PendingPair {
            key,
            first,
            second,
            stage: PairStage::Revealing { outstanding },
        });

        if outstanding == 0 {
            self.start_pair_preview(key);
        }
    }

    fn start_pair_preview(&mut self, key: PairKey) {
        let token = self.schedule(TimerOwner::Pair(key), self.settings.pair_preview);
        if let Some(index) = self.pair_index(key) {
            self.processing[index].stage = PairStage::Previewing(token);
        }
    }

    fn pair_flip_done(&mut self, key: PairKey) {
        let Some(index) = self.pair_index(key) else {
            return;
        };

        match self.processing[index].stage {
            PairStage::Revealing { outstanding } => {
                let outstanding = outstanding.saturating_sub(1);
                self.processing[index].stage = PairStage::Revealing { outstanding };
                if outstanding == 0 {
                    self.start_pair_preview(key);
                }
            }
            PairStage::FlippingBack { outstanding } => {
                let outstanding = outstanding.saturating_sub(1);
                self.processing[index].stage = PairStage::FlippingBack { outstanding };
                if outstanding == 0 {
                    self.release_pair(index);
                }
            }
            PairStage::Previewing(_) => {}
        }
    }

    fn release_pair(&mut self, index: usize) {
        let pair = self.processing.remove(index);
        debug!("pair {:?} released", pair.key);
        self.outbox.push(Effect::Checkpoint);
    }

    fn resolve_pair(&mut self, key: PairKey) {
        let Some(index) = self.pair_index(key) else {
            return;
        };
        let PendingPair { first, second, .. } = self.processing[index];

        let is_match = match (self.cards.get(first.index()), self.cards.get(second.index())) {
            (Some(a), Some(b)) => a.matches(b),
            _ => false,
        };

        if is_match {
            for card in [first, second] {
                if let Some(card) = self.cards.get_mut(card.index()) {
                    card.complete();
                }
            }
            self.processing.remove(index);
            self.matched_pairs = self.matched_pairs.saturating_add(1);
            self.score = self.score.saturating_add(self.settings.points_per_match);
            info!(
                score = self.score,
                matched = self.matched_pairs,
                needed = self.pairs_needed,
                "pair matched: {} + {}",
                first,
                second
            );

            self.outbox.push(Effect::Sound(SoundCue::Match));
            self.outbox.push(Effect::ScoreChanged(self.score));
            if !self.check_win() {
                self.outbox.push(Effect::Checkpoint);
            }
        } else {
            debug!("pair mismatched: {} + {}", first, second);
            self.outbox.push(Effect::Sound(SoundCue::Mismatch));

            let mut outstanding = 0;
            for card in [first, second] {
                if self.flip(card, Face::Down, Some(Waiter::Pair(key))).is_pending() {
                    outstanding += 1;
                }
            }

            if outstanding == 0 {
                self.release_pair(index);
            } else {
                self.processing[index].stage = PairStage::FlippingBack { outstanding };
            }
        }
    }

    /// Emit the completion effect the first time every pair is matched.
    fn check_win(&mut self) -> bool {
        if self.complete_emitted || self.matched_pairs < self.pairs_needed {
            return false;
        }
        self.complete_emitted = true;
        self.phase = Phase::Finished;
        self.selection = Selection::Idle;
        info!(score = self.score, "game complete");

        self.outbox.push(Effect::Sound(SoundCue::Complete));
        self.outbox.push(Effect::GameComplete);
        true
    }

    fn preview_flip_done(&mut self) {
        match self.phase {
            Phase::Previewing(PreviewStage::Revealing { outstanding }) => {
                let outstanding = outstanding.saturating_sub(1);
                self.phase = Phase::Previewing(PreviewStage::Revealing { outstanding });
                if outstanding == 0 {
                    self.preview_hold();
                }
            }
            Phase::Previewing(PreviewStage::Hiding { outstanding }) => {
                let outstanding = outstanding.saturating_sub(1);
                self.phase = Phase::Previewing(PreviewStage::Hiding { outstanding });
                if outstanding == 0 {
                    self.preview_finish();
                }
            }
            _ => {}
        }
    }

    fn preview_hold(&mut self) {
        self.phase = Phase::Previewing(PreviewStage::Holding);
        self.schedule(TimerOwner::Preview, self.settings.start_preview);
    }

    fn preview_hide(&mut self) {
        if self.phase != Phase::Previewing(PreviewStage::Holding) {
            return;
        }

        let mut outstanding = 0;
        for index in 0..self.cards.len() {
            if self.cards[index].is_completed() {
                continue;
            }
            if self.flip(CardRef::new(index as u32), Face::Down, Some(Waiter::Preview)).is_pending() {
                outstanding += 1;
            }
        }

        self.phase = Phase::Previewing(PreviewStage::Hiding { outstanding });
        if outstanding == 0 {
            self.preview_finish();
        }
    }

    fn preview_finish(&mut self) {
        info!("preview finished, accepting input");
        self.phase = Phase::Playing;
        if !self.check_win() {
            self.outbox.push(Effect::Checkpoint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PairId;

    /// Board of `pairs` pairs laid out as [0,0,1,1,2,2,...].
    fn engine(pairs: u64) -> MatchEngine {
        let cards = (0..pairs * 2)
            .map(|i| Card::new(CardRef::new(i as u32), PairId(i / 2)))
            .collect();
        MatchEngine::new(cards, GridSize::new(2, pairs as u32), 1.0, EngineSettings::instant())
    }

    fn complete_flips(engine: &mut MatchEngine, effects: &[Effect]) -> Vec<Effect> {
        effects
            .iter()
            .filter_map(Effect::as_flip)
            .flat_map(|r| engine.flip_completed(r.ticket))
            .collect()
    }

    #[test]
    fn test_select_flips_face_up() {
        let mut e = engine(2);
        let fx = e.activate(CardRef::new(0));

        assert_eq!(e.selection(), Selection::OneSelected(CardRef::new(0)));
        assert_eq!(fx.iter().filter_map(Effect::as_flip).count(), 1);
        assert!(fx.contains(&Effect::Sound(SoundCue::Flip)));
    }

    #[test]
    fn test_settled_face_waits_for_completion() {
        let mut e = engine(1);
        let fx = e.activate(CardRef::new(0));
        assert!(!e.card(CardRef::new(0)).unwrap().is_face_up());

        complete_flips(&mut e, &fx);
        assert!(e.card(CardRef::new(0)).unwrap().is_face_up());
    }

    #[test]
    fn test_unknown_card_ignored() {
        let mut e = engine(1);
        assert!(e.activate(CardRef::new(99)).is_empty());
        assert_eq!(e.selection(), Selection::Idle);
    }

    #[test]
    fn test_pair_waits_for_reveal_before_timer() {
        let mut e = engine(2);
        let fx1 = e.activate(CardRef::new(0));
        let fx2 = e.activate(CardRef::new(1));

        assert_eq!(e.processing_len(), 1);
        assert!(fx2.iter().all(|f| f.as_timer().is_none()));

        // First card's reveal alone is not enough.
        let after_first = complete_flips(&mut e, &fx1);
        assert!(after_first.iter().all(|f| f.as_timer().is_none()));

        let after_second = complete_flips(&mut e, &fx2);
        assert_eq!(after_second.iter().filter_map(Effect::as_timer).count(), 1);
    }

    #[test]
    fn test_stale_timer_ignored() {
        let mut e = engine(1).with_epoch(3);
        let stale = TimerToken { epoch: 2, seq: 0 };
        assert!(e.timer_elapsed(stale).is_empty());
    }

    #[test]
    fn test_preview_locks_until_hidden() {
        let mut e = engine(2);
        let reveal = e.begin_preview();
        assert!(e.is_locked());
        assert!(e.activate(CardRef::new(0)).is_empty());
        assert_eq!(reveal.iter().filter_map(Effect::as_flip).count(), 4);

        let hold = complete_flips(&mut e, &reveal);
        let timer = hold.iter().find_map(Effect::as_timer).unwrap();
        assert!(e.cards().iter().all(Card::is_face_up));

        let hide = e.timer_elapsed(timer);
        assert_eq!(hide.iter().filter_map(Effect::as_flip).count(), 4);
        assert!(e.is_locked());

        let done = complete_flips(&mut e, &hide);
        assert!(!e.is_locked());
        assert!(done.contains(&Effect::Checkpoint));
        assert!(e.cards().iter().all(|c| !c.is_face_up()));
        assert!(e.is_quiescent());
    }

    #[test]
    fn test_preview_keeps_completed_cards_up() {
        let cards = vec![
            Card::new(CardRef::new(0), PairId(0)).with_progress(Face::Up, true),
            Card::new(CardRef::new(1), PairId(0)).with_progress(Face::Up, true),
            Card::new(CardRef::new(2), PairId(1)),
            Card::new(CardRef::new(3), PairId(1)),
        ];
        let mut e = MatchEngine::with_progress(
            cards,
            GridSize::new(2, 2),
            1.0,
            EngineSettings::instant(),
            10,
            1,
        );

        let reveal = e.begin_preview();
        // Completed cards are already up; only the hidden pair animates.
        assert_eq!(reveal.iter().filter_map(Effect::as_flip).count(), 2);

        let hold = complete_flips(&mut e, &reveal);
        let hide = e.timer_elapsed(hold.iter().find_map(Effect::as_timer).unwrap());
        let hidden: Vec<_> = hide.iter().filter_map(Effect::as_flip).map(|r| r.card).collect();
        assert_eq!(hidden, vec![CardRef::new(2), CardRef::new(3)]);

        complete_flips(&mut e, &hide);
        assert!(e.card(CardRef::new(0)).unwrap().is_face_up());
        assert!(!e.card(CardRef::new(2)).unwrap().is_face_up());
    }
}
