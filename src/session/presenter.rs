//! The host-facing output port.

use crate::engine::{FlipRequest, SoundCue};

/// Receives everything the game wants shown or heard.
///
/// Only `request_flip` is required; the rest default to no-ops. A host that
/// animates flips itself must report each one back through
/// `Session::flip_completed` exactly once.
pub trait Presenter {
    fn request_flip(&mut self, request: &FlipRequest);

    fn play_sound(&mut self, _cue: SoundCue) {}

    fn report_score(&mut self, _score: u32) {}

    fn report_game_complete(&mut self) {}
}

/// Presenter that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn request_flip(&mut self, _request: &FlipRequest) {}
}

/// Presenter that keeps a log of every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingPresenter {
    pub flips: Vec<FlipRequest>,
    pub sounds: Vec<SoundCue>,
    pub scores: Vec<u32>,
    pub completions: u32,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flips requested since the last call.
    pub fn take_flips(&mut self) -> Vec<FlipRequest> {
        std::mem::take(&mut self.flips)
    }

    /// Most recently reported score.
    #[must_use]
    pub fn last_score(&self) -> Option<u32> {
        self.scores.last().copied()
    }
}

impl Presenter for RecordingPresenter {
    fn request_flip(&mut self, request: &FlipRequest) {
        self.flips.push(*request);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }

    fn report_score(&mut self, score: u32) {
        self.scores.push(score);
    }

    fn report_game_complete(&mut self) {
        self.completions += 1;
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn request_flip(&mut self, request: &FlipRequest) {
        (**self).request_flip(request);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        (**self).play_sound(cue);
    }

    fn report_score(&mut self, score: u32) {
        (**self).report_score(score);
    }

    fn report_game_complete(&mut self) {
        (**self).report_game_complete();
    }
}
