//! Session control: wires the engine to a presenter, a clock and a save slot.
//!
//! ## Key Types
//!
//! - [`Session`]: start, resume, restart, resize; routes input and effects
//! - [`Presenter`]: host port for flips, sounds, score and completion
//! - [`Scheduler`]: virtual-time queue of timers and timed flips

mod controller;
mod error;
mod presenter;
mod scheduler;

pub use controller::{FlipTiming, Session, StartKind};
pub use error::SessionError;
pub use presenter::{NullPresenter, Presenter, RecordingPresenter};
pub use scheduler::{Scheduled, Scheduler};
