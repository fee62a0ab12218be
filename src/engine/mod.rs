//! Match engine: selection, pairing, scoring and win detection.
//!
//! The engine is a pure state machine. It owns the cards and the processing
//! set, and talks to the outside world only through [`Effect`]s and the
//! completion tokens that come back.
//!
//! ## Example Usage
//!
//! ```
//! use memory_match::cards::Card;
//! use memory_match::core::{CardRef, GridSize, PairId};
//! use memory_match::engine::{Effect, EngineSettings, MatchEngine};
//!
//! let cards = vec![
//!     Card::new(CardRef::new(0), PairId(0)),
//!     Card::new(CardRef::new(1), PairId(0)),
//! ];
//! let mut engine = MatchEngine::new(cards, GridSize::new(2, 1), 1.0, EngineSettings::instant());
//!
//! let mut pending: Vec<Effect> = engine.activate(CardRef::new(0));
//! pending.extend(engine.activate(CardRef::new(1)));
//!
//! // Drive every flip and timer to completion.
//! while let Some(effect) = pending.pop() {
//!     match effect {
//!         Effect::Flip(request) => pending.extend(engine.flip_completed(request.ticket)),
//!         Effect::Schedule { timer, .. } => pending.extend(engine.timer_elapsed(timer)),
//!         _ => {}
//!     }
//! }
//!
//! assert_eq!(engine.score(), 10);
//! assert!(engine.is_complete());
//! ```

mod effect;
mod flips;
mod matcher;

pub use effect::{Effect, FlipRequest, FlipTicket, SoundCue, TimerToken};
pub use matcher::{EngineSettings, MatchEngine, Selection};
