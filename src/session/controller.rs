//! The session: owns the engine, the timeline, the presenter and the save slot.
//!
//! ## Lifecycle
//!
//! ```text
//! new ──▶ resume_or_start ──▶ (preview) ──▶ play ──▶ win ──▶ restart / resize
//!              │                                 ▲
//!              └── missing or corrupt save ──▶ start_new
//! ```
//!
//! Each game gets a fresh engine epoch and an empty timeline, so nothing
//! scheduled by an earlier game can reach the new one.

use std::time::Duration;

use tracing::{error, info, warn};

use super::error::SessionError;
use super::presenter::Presenter;
use super::scheduler::{Scheduled, Scheduler};
use crate::cards::Deck;
use crate::core::{CardRef, GameConfig, GameRng, GridSize};
use crate::engine::{Effect, EngineSettings, FlipTicket, MatchEngine};
use crate::persist::{decode, encode, SaveFormat, SaveGame, SaveStore};

/// Who reports flip completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipTiming {
    /// The session completes every flip after this duration of `advance`.
    Timed(Duration),
    /// The host reports each flip through [`Session::flip_completed`].
    External,
}

/// How the current game began.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartKind {
    Resumed,
    Fresh,
}

/// One player's game: the engine, its timeline, the presenter it reports to
/// and the store it checkpoints into.
///
/// Time only moves through [`Session::advance`]; flips complete either on
/// that clock or through [`Session::flip_completed`].
pub struct Session<P: Presenter, S: SaveStore> {
    config: GameConfig,
    engine: MatchEngine,
    scheduler: Scheduler,
    presenter: P,
    store: S,
    format: SaveFormat,
    flip_timing: FlipTiming,
    next_epoch: u32,
}

impl<P: Presenter, S: SaveStore> Session<P, S> {
    /// Create a session. The board stays empty until a game is started.
    pub fn new(config: GameConfig, presenter: P, store: S) -> Result<Self, SessionError> {
        config.validate()?;
        let engine = MatchEngine::new(
            Vec::new(),
            config.grid,
            config.card_spacing,
            EngineSettings::from(&config),
        );
        let flip_timing = FlipTiming::Timed(config.timings.flip());

        Ok(Self {
            config,
            engine,
            scheduler: Scheduler::new(),
            presenter,
            store,
            format: SaveFormat::default(),
            flip_timing,
            next_epoch: 0,
        })
    }

    #[must_use]
    pub fn with_format(mut self, format: SaveFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_flip_timing(mut self, timing: FlipTiming) -> Self {
        self.flip_timing = timing;
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn format(&self) -> SaveFormat {
        self.format
    }

    #[must_use]
    pub fn flip_timing(&self) -> FlipTiming {
        self.flip_timing
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Number of timers and timed flips waiting on the clock.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    // === Game lifecycle ===

    /// Deal a fresh board and run the opening preview.
    ///
    /// The configuration is checked before any card exists.
    pub fn start_new(&mut self) -> Result<(), SessionError> {
        self.config.validate()?;

        let epoch = self.next_epoch;
        let rng = GameRng::new(self.config.seed.wrapping_add(u64::from(epoch)));
        let deck = Deck::generate(
            self.config.grid.pair_count(),
            self.config.textures.len(),
            &self.config.colors,
            &rng,
        )?;
        let cards = deck.lay_out(self.config.grid, self.config.card_spacing);

        info!(grid = %self.config.grid, pairs = deck.pair_count(), "starting new game");
        let engine = MatchEngine::new(
            cards,
            self.config.grid,
            self.config.card_spacing,
            EngineSettings::from(&self.config),
        );
        self.install(engine);
        Ok(())
    }

    /// Resume the saved game, or start a new one when there is none.
    ///
    /// A save that cannot be read or decoded is discarded and a new game
    /// starts in its place.
    pub fn resume_or_start(&mut self) -> Result<StartKind, SessionError> {
        match self.load_saved() {
            Ok(Some(save)) => {
                let engine = save.restore(EngineSettings::from(&self.config))?;
                self.config.grid = save.grid();
                self.config.card_spacing = save.card_spacing;

                info!(
                    grid = %save.grid(),
                    score = save.score,
                    matched = save.matched_pairs,
                    "resuming saved game"
                );
                self.install(engine);
                Ok(StartKind::Resumed)
            }
            Ok(None) => {
                info!("no saved game");
                self.start_new()?;
                Ok(StartKind::Fresh)
            }
            Err(e) => {
                warn!("discarding unusable save: {}", e);
                if let Err(e) = self.store.delete() {
                    warn!("failed to delete save: {}", e);
                }
                self.start_new()?;
                Ok(StartKind::Fresh)
            }
        }
    }

    /// Drop the save and deal a new board.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if let Err(e) = self.store.delete() {
            warn!("failed to delete save: {}", e);
        }
        self.start_new()
    }

    /// Change the grid size from raw input and restart.
    ///
    /// Returns the grid actually used after clamping.
    pub fn resize(&mut self, width: i64, height: i64) -> Result<GridSize, SessionError> {
        let grid = GridSize::from_input(width, height);
        info!(requested_width = width, requested_height = height, grid = %grid, "resizing grid");
        self.config.grid = grid;
        self.restart()?;
        Ok(grid)
    }

    /// Write the current state to the store now.
    pub fn save_now(&self) -> Result<(), SessionError> {
        let bytes = encode(&SaveGame::capture(&self.engine), self.format)?;
        self.store.save(&bytes)?;
        Ok(())
    }

    // === Input ===

    /// Player clicked `card`.
    pub fn activate(&mut self, card: CardRef) {
        let effects = self.engine.activate(card);
        self.dispatch(effects);
    }

    /// The host finished animating the flip identified by `ticket`.
    pub fn flip_completed(&mut self, ticket: FlipTicket) {
        let effects = self.engine.flip_completed(ticket);
        self.dispatch(effects);
    }

    /// Move the clock by `dt` and run everything that came due.
    ///
    /// Continuations scheduled while draining run in the same call if their
    /// deadline has also passed.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.scheduler.now().saturating_add(dt);
        while let Some(event) = self.scheduler.pop_due_by(target) {
            let effects = match event {
                Scheduled::Timer(token) => self.engine.timer_elapsed(token),
                Scheduled::FlipDone(ticket) => self.engine.flip_completed(ticket),
            };
            self.dispatch(effects);
        }
        self.scheduler.advance_to(target);
    }

    // === Internals ===

    fn load_saved(&self) -> Result<Option<SaveGame>, SessionError> {
        let Some(bytes) = self.store.load()? else {
            return Ok(None);
        };
        Ok(Some(decode(&bytes, self.format)?))
    }

    fn install(&mut self, engine: MatchEngine) {
        let epoch = self.next_epoch;
        self.next_epoch = self.next_epoch.wrapping_add(1);

        self.scheduler.clear();
        self.engine = engine.with_epoch(epoch);
        self.presenter.report_score(self.engine.score());

        let effects = self.engine.begin_preview();
        self.dispatch(effects);
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Flip(request) => {
                    self.presenter.request_flip(&request);
                    if let FlipTiming::Timed(duration) = self.flip_timing {
                        self.scheduler
                            .schedule(duration, Scheduled::FlipDone(request.ticket));
                    }
                }
                Effect::Sound(cue) => self.presenter.play_sound(cue),
                Effect::ScoreChanged(score) => self.presenter.report_score(score),
                Effect::GameComplete => {
                    self.presenter.report_game_complete();
                    if let Err(e) = self.store.delete() {
                        warn!("failed to delete save after win: {}", e);
                    }
                }
                Effect::Schedule { timer, after } => {
                    self.scheduler.schedule(after, Scheduled::Timer(timer));
                }
                Effect::Checkpoint => self.checkpoint(),
            }
        }
    }

    fn checkpoint(&self) {
        let bytes = match encode(&SaveGame::capture(&self.engine), self.format) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("failed to encode checkpoint: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save(&bytes) {
            warn!("failed to write checkpoint: {}", e);
        }
    }
}
