//! Effects the engine emits and the tokens that come back.
//!
//! The engine never calls the presenter directly. Every transition returns a
//! list of [`Effect`]s; the caller performs them and later feeds completions
//! back in:
//!
//! - `Effect::Flip` → report `flip_completed(request.ticket)` exactly once
//! - `Effect::Schedule` → report `timer_elapsed(timer)` after `after`
//!
//! Tickets and timer tokens carry the engine epoch. A token from an older
//! epoch is ignored, so continuations scheduled before a new game started
//! can never complete a join in the new one.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cards::Face;
use crate::core::CardRef;

/// Completion handle of one flip animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlipTicket {
    pub epoch: u32,
    pub seq: u32,
}

impl std::fmt::Display for FlipTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Flip({}:{})", self.epoch, self.seq)
    }
}

/// Handle of one deferred continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken {
    pub epoch: u32,
    pub seq: u32,
}

impl std::fmt::Display for TimerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timer({}:{})", self.epoch, self.seq)
    }
}

/// Request to animate a card toward `face`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipRequest {
    pub ticket: FlipTicket,
    pub card: CardRef,
    pub face: Face,
}

/// Best-effort audio cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Flip,
    Match,
    Mismatch,
    Complete,
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Animate a card; completion must be reported with the ticket.
    Flip(FlipRequest),

    /// Play a sound. Fire-and-forget.
    Sound(SoundCue),

    /// The score changed to this value.
    ScoreChanged(u32),

    /// Every pair is matched. Emitted once per session.
    GameComplete,

    /// Call back `timer_elapsed(timer)` once `after` has passed.
    Schedule { timer: TimerToken, after: Duration },

    /// A transition finished; the state is safe to persist.
    Checkpoint,
}

impl Effect {
    /// The flip request, if this is a flip.
    #[must_use]
    pub fn as_flip(&self) -> Option<&FlipRequest> {
        match self {
            Effect::Flip(request) => Some(request),
            _ => None,
        }
    }

    /// The timer token, if this is a schedule request.
    #[must_use]
    pub fn as_timer(&self) -> Option<TimerToken> {
        match self {
            Effect::Schedule { timer, .. } => Some(*timer),
            _ => None,
        }
    }
}
