//! Session integration tests: start, resume, restart, resize and the clock.

use std::time::Duration;

use memory_match::core::{CardRef, GameConfig, GridSize, Timings};
use memory_match::engine::SoundCue;
use memory_match::persist::{
    encode, FileSaveStore, MemorySaveStore, SaveFormat, SaveGame, SaveStore,
};
use memory_match::session::{FlipTiming, RecordingPresenter, Session, StartKind};

type TestSession = Session<RecordingPresenter, MemorySaveStore>;

fn instant() -> Timings {
    Timings {
        start_preview_ms: 0,
        pair_preview_ms: 0,
        flip_ms: 0,
    }
}

fn config(width: u32, height: u32) -> GameConfig {
    GameConfig::default().with_grid(width, height).with_timings(instant())
}

fn session_with(config: GameConfig, store: MemorySaveStore) -> TestSession {
    Session::new(config, RecordingPresenter::new(), store).unwrap()
}

/// Slot of the card sharing an identity with `slot`.
fn partner_of<S: SaveStore>(session: &Session<RecordingPresenter, S>, slot: u32) -> u32 {
    let cards = session.engine().cards();
    let pair = cards[slot as usize].pair();
    cards
        .iter()
        .find(|c| c.pair() == pair && c.slot() != CardRef::new(slot))
        .map(|c| c.slot().0)
        .unwrap()
}

fn play_pair<S: SaveStore>(session: &mut Session<RecordingPresenter, S>, a: u32, b: u32) {
    session.activate(CardRef::new(a));
    session.activate(CardRef::new(b));
    session.advance(Duration::ZERO);
}

/// Start (or resume) and finish the preview.
fn ready<S: SaveStore>(session: &mut Session<RecordingPresenter, S>) -> StartKind {
    let kind = session.resume_or_start().unwrap();
    session.advance(Duration::ZERO);
    kind
}

// =============================================================================
// Starting
// =============================================================================

#[test]
fn test_fresh_start_without_save() {
    let mut s = session_with(config(4, 4), MemorySaveStore::new());
    assert_eq!(s.resume_or_start().unwrap(), StartKind::Fresh);
    assert_eq!(s.engine().cards().len(), 16);
    assert!(s.engine().is_locked());

    s.advance(Duration::ZERO);
    assert!(!s.engine().is_locked());
    assert!(s.engine().cards().iter().all(|c| !c.is_face_up()));
    // The end of the preview is a checkpoint.
    assert!(s.store().exists());
}

#[test]
fn test_invalid_config_rejected() {
    let result = Session::new(
        GameConfig::default().with_grid(5, 5),
        RecordingPresenter::new(),
        MemorySaveStore::new(),
    );
    assert!(result.is_err());
}

#[test]
fn test_first_game_follows_config_seed() {
    let mut a = session_with(config(4, 4).with_seed(5), MemorySaveStore::new());
    let mut b = session_with(config(4, 4).with_seed(5), MemorySaveStore::new());
    a.start_new().unwrap();
    b.start_new().unwrap();

    let pairs = |s: &TestSession| s.engine().cards().iter().map(|c| c.pair()).collect::<Vec<_>>();
    assert_eq!(pairs(&a), pairs(&b));
}

// =============================================================================
// Resuming
// =============================================================================

#[test]
fn test_resume_restores_progress() {
    let mut first = session_with(config(2, 2), MemorySaveStore::new());
    ready(&mut first);
    let partner = partner_of(&first, 0);
    play_pair(&mut first, 0, partner);
    assert_eq!(first.score(), 10);

    let bytes = first.store().load().unwrap().unwrap();
    let mut second = session_with(config(2, 2), MemorySaveStore::with_bytes(bytes));

    assert_eq!(second.resume_or_start().unwrap(), StartKind::Resumed);
    assert_eq!(second.score(), 10);
    assert_eq!(second.presenter().scores.first(), Some(&10));
    assert!(second.engine().is_locked());

    second.advance(Duration::ZERO);
    let cards = second.engine().cards();
    assert!(cards[0].is_completed() && cards[0].is_face_up());
    assert!(cards[partner as usize].is_face_up());
    assert_eq!(cards.iter().filter(|c| c.is_face_up()).count(), 2);
}

#[test]
fn test_resume_uses_saved_grid() {
    let mut first = session_with(config(2, 3), MemorySaveStore::new());
    ready(&mut first);
    let bytes = first.store().load().unwrap().unwrap();

    let mut second = session_with(config(4, 4), MemorySaveStore::with_bytes(bytes));
    assert_eq!(ready(&mut second), StartKind::Resumed);
    assert_eq!(second.engine().cards().len(), 6);
    assert_eq!(second.config().grid, GridSize::new(2, 3));
}

#[test]
fn test_corrupt_save_falls_back_to_new_game() {
    let store = MemorySaveStore::with_bytes(b"{\"score\": 3".to_vec());
    let mut s = session_with(config(2, 2), store);

    assert_eq!(ready(&mut s), StartKind::Fresh);
    assert_eq!(s.score(), 0);
    assert_eq!(s.engine().cards().len(), 4);

    // The unusable save was replaced by the new game's checkpoint.
    let bytes = s.store().load().unwrap().unwrap();
    assert!(memory_match::persist::decode(&bytes, SaveFormat::Json).is_ok());
}

#[test]
fn test_save_with_unreachable_score_falls_back() {
    let mut first = session_with(config(2, 2), MemorySaveStore::new());
    ready(&mut first);
    let partner = partner_of(&first, 0);
    play_pair(&mut first, 0, partner);

    let mut save = SaveGame::capture(first.engine());
    save.score = u32::MAX;
    let bytes = encode(&save, SaveFormat::Json).unwrap();

    let mut second = session_with(config(2, 2), MemorySaveStore::with_bytes(bytes));
    assert_eq!(ready(&mut second), StartKind::Fresh);
    assert_eq!(second.score(), 0);

    let (a, b) = (0, partner_of(&second, 0));
    play_pair(&mut second, a, b);
    assert_eq!(second.score(), 10);
}

#[test]
fn test_resume_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let partner;
    {
        let store = FileSaveStore::new(dir.path(), SaveFormat::Bincode).unwrap();
        let mut s = Session::new(config(2, 2), RecordingPresenter::new(), store)
            .unwrap()
            .with_format(SaveFormat::Bincode);
        ready(&mut s);
        partner = partner_of(&s, 0);
        play_pair(&mut s, 0, partner);
    }

    let store = FileSaveStore::new(dir.path(), SaveFormat::Bincode).unwrap();
    let mut s = Session::new(config(2, 2), RecordingPresenter::new(), store)
        .unwrap()
        .with_format(SaveFormat::Bincode);
    assert_eq!(ready(&mut s), StartKind::Resumed);
    assert_eq!(s.score(), 10);
    assert!(s.engine().cards()[partner as usize].is_completed());
}

// =============================================================================
// Winning, restarting and resizing
// =============================================================================

#[test]
fn test_win_deletes_save() {
    let mut s = session_with(config(2, 1), MemorySaveStore::new());
    ready(&mut s);
    assert!(s.store().exists());

    play_pair(&mut s, 0, 1);
    assert!(s.is_complete());
    assert_eq!(s.presenter().completions, 1);
    assert!(s.presenter().sounds.contains(&SoundCue::Complete));
    assert_eq!(s.presenter().last_score(), Some(10));
    assert!(!s.store().exists());
}

#[test]
fn test_restart_discards_progress() {
    let mut s = session_with(config(2, 2), MemorySaveStore::new());
    ready(&mut s);
    let partner = partner_of(&s, 0);
    play_pair(&mut s, 0, partner);

    s.restart().unwrap();
    assert_eq!(s.score(), 0);
    assert!(s.engine().cards().iter().all(|c| !c.is_completed()));
    assert!(!s.store().exists());
}

#[test]
fn test_resize_clamps_and_evens() {
    let mut s = session_with(config(2, 2), MemorySaveStore::new());
    ready(&mut s);

    assert_eq!(s.resize(3, 3).unwrap(), GridSize::new(3, 4));
    assert_eq!(s.engine().cards().len(), 12);

    assert_eq!(s.resize(100, -5).unwrap(), GridSize::new(12, 1));
    assert_eq!(s.engine().cards().len(), 12);
    assert_eq!(s.config().grid, GridSize::new(12, 1));
}

// =============================================================================
// Clock and flip timing
// =============================================================================

#[test]
fn test_default_timings_drive_a_turn() {
    let config = GameConfig::default().with_grid(2, 2);
    let mut s = session_with(config, MemorySaveStore::new());
    s.start_new().unwrap();

    // Reveal 300ms + hold 2000ms + hide 300ms.
    s.advance(Duration::from_millis(2599));
    assert!(s.engine().is_locked());
    s.advance(Duration::from_millis(1));
    assert!(!s.engine().is_locked());

    let partner = partner_of(&s, 0);
    s.activate(CardRef::new(0));
    s.activate(CardRef::new(partner));

    // Flip 300ms + pair preview 1000ms.
    s.advance(Duration::from_millis(1299));
    assert_eq!(s.score(), 0);
    s.advance(Duration::from_millis(1));
    assert_eq!(s.score(), 10);
    assert_eq!(s.now(), Duration::from_millis(3900));
}

#[test]
fn test_advance_far_past_the_clock() {
    let mut s = session_with(GameConfig::default().with_grid(2, 2), MemorySaveStore::new());
    s.start_new().unwrap();

    s.advance(Duration::from_millis(1));
    s.advance(Duration::MAX);
    assert_eq!(s.now(), Duration::MAX);
    assert!(!s.engine().is_locked());

    // Flips scheduled at the saturated clock still complete.
    let partner = partner_of(&s, 0);
    play_pair(&mut s, 0, partner);
    assert_eq!(s.score(), 10);
}

#[test]
fn test_external_flips_wait_for_host() {
    let mut s = session_with(config(2, 2), MemorySaveStore::new())
        .with_flip_timing(FlipTiming::External);
    s.start_new().unwrap();

    s.advance(Duration::from_secs(10));
    assert!(s.engine().is_locked());

    // Reveal, then hide.
    for _ in 0..2 {
        let flips = s.presenter_mut().take_flips();
        assert_eq!(flips.len(), 4);
        for flip in flips {
            s.flip_completed(flip.ticket);
        }
        s.advance(Duration::ZERO);
    }
    assert!(!s.engine().is_locked());
}

#[test]
fn test_old_game_tickets_ignored_after_restart() {
    let mut s = session_with(config(2, 2), MemorySaveStore::new())
        .with_flip_timing(FlipTiming::External);
    s.start_new().unwrap();
    let stale = s.presenter_mut().take_flips();

    s.restart().unwrap();
    for flip in &stale {
        s.flip_completed(flip.ticket);
    }
    assert_eq!(s.engine().flips_in_flight(), 4);
    assert!(s.engine().cards().iter().all(|c| !c.is_face_up()));
}

#[test]
fn test_save_now_writes_current_state() {
    let mut s = session_with(config(2, 2), MemorySaveStore::new());
    s.start_new().unwrap();
    assert!(!s.store().exists());

    s.save_now().unwrap();
    assert!(s.store().exists());
}
