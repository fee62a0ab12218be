//! Cooperative timeline for deferred continuations.
//!
//! The session owns a virtual clock that only moves when the host advances
//! it. Due entries come out in deadline order; entries with the same
//! deadline come out in the order they were scheduled. Popping an entry
//! moves the clock to its deadline, so anything it schedules is timed from
//! the moment it fired.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::engine::{FlipTicket, TimerToken};

/// A continuation waiting on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheduled {
    /// Engine timer: report `timer_elapsed`.
    Timer(TimerToken),
    /// Timed flip animation: report `flip_completed`.
    FlipDone(FlipTicket),
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    deadline: Duration,
    seq: u64,
    event: Scheduled,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of continuations keyed by virtual deadline.
///
/// Deadlines saturate at `Duration::MAX`, so a far-off entry is simply
/// never due rather than an overflow.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue `event` to fire `after` from now.
    pub fn schedule(&mut self, after: Duration, event: Scheduled) {
        let entry = Entry {
            deadline: self.now.saturating_add(after),
            seq: self.next_seq,
            event,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(entry));
    }

    /// Pop the earliest entry due at or before `target`, moving the clock
    /// to its deadline.
    pub fn pop_due_by(&mut self, target: Duration) -> Option<Scheduled> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.deadline <= target => {
                let Reverse(entry) = self.queue.pop()?;
                self.now = self.now.max(entry.deadline);
                Some(entry.event)
            }
            _ => None,
        }
    }

    /// Move the clock to `target`. The clock never runs backwards.
    pub fn advance_to(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }

    /// Drop every pending entry. The clock keeps its value.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
