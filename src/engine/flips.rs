//! In-flight flip bookkeeping.
//!
//! Every animation the engine requests becomes a [`FlipJob`] keyed by its
//! ticket. Transitions that must wait for a flip register a [`Waiter`] on
//! the job; completing the job hands the waiters back so the engine can
//! advance each join counter.
//!
//! Requests are idempotent per card:
//! - if the most recent job for the card already targets the same face, the
//!   waiter joins that job instead of starting another animation
//! - if nothing is in flight and the card already rests on that face, the
//!   request settles immediately

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::effect::{FlipRequest, FlipTicket};
use crate::cards::{Card, Face};
use crate::core::CardRef;

/// Identifier of a pair in the processing set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey(pub u32);

/// Who is waiting for a flip to finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waiter {
    Pair(PairKey),
    Preview,
}

#[derive(Clone, Debug)]
struct FlipJob {
    card: CardRef,
    face: Face,
    waiters: SmallVec<[Waiter; 2]>,
}

/// Result of asking for a card to reach a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// A new animation must be requested from the presenter.
    Requested(FlipRequest),
    /// An animation toward that face was already in flight; the waiter joined it.
    Joined,
    /// The card already rests on that face; nothing to wait for.
    Settled,
}

impl FlipOutcome {
    /// True when the caller has to wait for a completion.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !matches!(self, FlipOutcome::Settled)
    }
}

/// A finished flip.
#[derive(Clone, Debug)]
pub struct CompletedFlip {
    pub card: CardRef,
    pub face: Face,
    /// False when a later flip of the same card is still in flight; the
    /// card's settled face should then be left to that later flip.
    pub is_latest: bool,
    pub waiters: SmallVec<[Waiter; 2]>,
}

/// Jobs in flight for one engine epoch.
#[derive(Clone, Debug, Default)]
pub struct FlipTracker {
    epoch: u32,
    next_seq: u32,
    jobs: FxHashMap<FlipTicket, FlipJob>,
    latest: FxHashMap<CardRef, FlipTicket>,
}

impl FlipTracker {
    #[must_use]
    pub fn new(epoch: u32) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }

    /// Ask for `card` to end up on `face`.
    pub fn request(&mut self, card: &Card, face: Face, waiter: Option<Waiter>) -> FlipOutcome {
        let slot = card.slot();

        if let Some(ticket) = self.latest.get(&slot) {
            if let Some(job) = self.jobs.get_mut(ticket) {
                if job.face == face {
                    job.waiters.extend(waiter);
                    return FlipOutcome::Joined;
                }
            }
        } else if card.face() == face {
            return FlipOutcome::Settled;
        }

        let ticket = FlipTicket {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        self.jobs.insert(
            ticket,
            FlipJob {
                card: slot,
                face,
                waiters: waiter.into_iter().collect(),
            },
        );
        self.latest.insert(slot, ticket);

        FlipOutcome::Requested(FlipRequest {
            ticket,
            card: slot,
            face,
        })
    }

    /// Retire a job. Returns `None` for stale or already-completed tickets.
    pub fn complete(&mut self, ticket: FlipTicket) -> Option<CompletedFlip> {
        if ticket.epoch != self.epoch {
            return None;
        }
        let job = self.jobs.remove(&ticket)?;

        let is_latest = self.latest.get(&job.card) == Some(&ticket);
        if is_latest {
            self.latest.remove(&job.card);
        }

        Some(CompletedFlip {
            card: job.card,
            face: job.face,
            is_latest,
            waiters: job.waiters,
        })
    }

    /// Number of animations in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    /// True when `card` has an animation in flight.
    #[must_use]
    pub fn is_flipping(&self, card: CardRef) -> bool {
        self.latest.contains_key(&card)
    }
}
