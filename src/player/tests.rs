use std::path::PathBuf;
use std::time::Duration;

use super::*;
use crate::engine::testing::MockEngine;
use crate::error::PlayerError;
use crate::library::Track;

fn t(title: &str) -> Track {
    Track::new(PathBuf::from(format!("/tmp/{title}.mp3")), title)
}

fn player(n: usize) -> (PlaybackController<MockEngine>, MockEngine) {
    let engine = MockEngine::new();
    let tracks = (0..n).map(|i| t(&format!("track{i}"))).collect();
    let p = PlaybackController::new(engine.clone(), tracks, PlayerOptions::default()).unwrap();
    (p, engine)
}

#[test]
fn empty_playlist_is_rejected() {
    let err = PlaybackController::new(MockEngine::new(), Vec::new(), PlayerOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, PlayerError::EmptyPlaylist));
}

#[test]
fn first_track_title_is_shown_before_playing() {
    let (p, _) = player(2);
    assert_eq!(p.display().title, "track0");
    assert_eq!(p.transport_state(), TransportState::Idle);
}

#[test]
fn skip_to_sets_active_index() {
    let (mut p, _) = player(4);
    for i in [2, 0, 3, 1] {
        p.skip_to(i).unwrap();
        assert_eq!(p.active_index(), i);
        assert_eq!(p.display().title, format!("track{i}"));
    }
}

#[test]
fn skip_wraps_in_both_directions() {
    let (mut p, _) = player(3);
    p.skip_to(2).unwrap();
    p.skip(Direction::Next).unwrap();
    assert_eq!(p.active_index(), 0);

    p.skip(Direction::Prev).unwrap();
    assert_eq!(p.active_index(), 2);
}

#[test]
fn neighbour_indices_wrap() {
    let (mut p, _) = player(3);
    assert_eq!(p.playlist().prev_index(), 2);
    assert_eq!(p.playlist().next_index(), 1);
    p.skip_to(2).unwrap();
    assert_eq!(p.playlist().next_index(), 0);
}

#[test]
fn entries_are_looked_up_by_index() {
    let (p, _) = player(3);
    let entry = p.playlist().entry(1).unwrap();
    assert_eq!(entry.track.title, "track1");
    assert!(p.playlist().entry(3).is_none());
}

#[test]
fn invalid_index_is_reported_and_nothing_stops() {
    let (mut p, engine) = player(2);
    p.play(None).unwrap();

    let err = p.skip_to(5).unwrap_err();
    assert!(matches!(err, PlayerError::InvalidIndex { index: 5, len: 2 }));
    assert!(p.is_playing());
    assert_eq!(engine.track(0).borrow().stops, 0);

    assert!(matches!(
        p.play(Some(2)),
        Err(PlayerError::InvalidIndex { index: 2, len: 2 })
    ));
}

#[test]
fn pause_then_play_reuses_the_handle() {
    let (mut p, engine) = player(1);
    p.play(None).unwrap();
    let id = p.playlist().active_handle().unwrap().id();

    p.pause();
    assert_eq!(p.transport_state(), TransportState::Paused);
    p.play(None).unwrap();

    assert_eq!(engine.loads(), 1);
    assert_eq!(p.playlist().active_handle().unwrap().id(), id);
    assert_eq!(engine.track(0).borrow().plays, 2);
}

#[test]
fn pause_before_anything_loaded_is_a_no_op() {
    let (mut p, engine) = player(2);
    p.pause();
    assert_eq!(engine.loads(), 0);
    assert_eq!(p.transport_state(), TransportState::Idle);
}

#[test]
fn skip_to_stops_previous_track_before_playing_next() {
    let (mut p, engine) = player(2);
    p.play(None).unwrap();
    p.skip_to(1).unwrap();

    let first = engine.track(0);
    assert!(!first.borrow().playing);
    assert_eq!(first.borrow().stops, 1);
    assert!(engine.track(1).borrow().playing);
}

#[test]
fn playing_another_index_directly_keeps_one_track_active() {
    let (mut p, engine) = player(2);
    p.play(Some(0)).unwrap();
    p.play(Some(1)).unwrap();
    assert!(!engine.track(0).borrow().playing);
    assert!(engine.track(1).borrow().playing);
}

#[test]
fn volume_is_clamped_before_reaching_the_engine() {
    let (mut p, engine) = player(1);
    p.set_volume(-0.2);
    p.set_volume(1.5);
    p.set_volume(f32::NAN);
    p.set_volume(0.4);
    assert_eq!(*engine.volumes.borrow(), vec![0.0, 1.0, 0.0, 0.4]);
    assert_eq!(p.volume(), 0.4);
    assert_eq!(p.display().volume, 0.4);
}

#[test]
fn seek_while_paused_is_ignored() {
    let (mut p, engine) = player(1);
    p.play(None).unwrap();
    p.pause();

    assert!(!p.seek_to_seconds(30.0));
    assert!(!p.seek_to_fraction(0.5));
    assert!(engine.track(0).borrow().seeks.is_empty());
}

#[test]
fn seek_before_loading_is_ignored() {
    let (mut p, engine) = player(1);
    assert!(!p.seek_to_seconds(30.0));
    assert_eq!(engine.loads(), 0);
}

#[test]
fn seeks_apply_while_playing() {
    let (mut p, engine) = player(1);
    p.play(None).unwrap();

    assert!(p.seek_to_fraction(0.5));
    assert!(p.seek_to_seconds(-3.0));
    assert!(p.seek_to_fraction(7.0));
    assert_eq!(
        engine.track(0).borrow().seeks,
        vec![
            Duration::from_secs(90),
            Duration::ZERO,
            Duration::from_secs(180)
        ]
    );
}

#[test]
fn position_is_only_reported_while_playing() {
    let (mut p, engine) = player(1);
    assert_eq!(p.current_position_formatted(), None);

    p.play(None).unwrap();
    engine.set_position(0, Duration::from_millis(64_600));
    assert_eq!(p.current_position_formatted().as_deref(), Some("1:05"));

    p.pause();
    assert_eq!(p.current_position_formatted(), None);
}

#[test]
fn play_event_starts_the_progress_loop() {
    let (mut p, engine) = player(1);
    p.play(None).unwrap();
    assert!(!p.frame_pending());

    p.pump_events().unwrap();
    assert!(p.frame_pending());
    assert_eq!(p.display().duration, "3:00");
    assert!(p.display().wave_visible);
    assert!(p.display().pause_visible);

    engine.set_position(0, Duration::from_secs(45));
    assert!(p.on_frame());
    assert_eq!(p.display().timer, "0:45");
    assert!((p.display().progress - 0.25).abs() < 1e-9);
    assert!(p.frame_pending());
}

#[test]
fn progress_loop_stops_itself_once_not_playing() {
    let (mut p, _) = player(1);
    p.play(None).unwrap();
    p.pump_events().unwrap();

    p.pause();
    p.pump_events().unwrap();
    assert!(!p.display().wave_visible);

    // The pending step still runs once, then does not reschedule.
    assert!(p.on_frame());
    assert!(!p.frame_pending());
    assert!(!p.on_frame());
}

#[test]
fn seek_event_restarts_the_progress_loop() {
    let (mut p, engine) = player(1);
    p.play(None).unwrap();
    p.pump_events().unwrap();
    p.pause();
    p.on_frame();
    assert!(!p.frame_pending());

    // Resumed behind the controller's back; only the seek notices it.
    engine.track(0).borrow_mut().playing = true;
    assert!(p.seek_to_seconds(10.0));
    assert!(!p.frame_pending());
    p.pump_events().unwrap();
    assert!(p.frame_pending());
}

#[test]
fn skip_to_resets_progress() {
    let (mut p, engine) = player(2);
    p.play(None).unwrap();
    p.pump_events().unwrap();
    engine.set_position(0, Duration::from_secs(90));
    p.on_frame();
    assert_eq!(p.display().timer, "1:30");

    p.skip_to(1).unwrap();
    assert_eq!(p.display().timer, "0:00");
    assert_eq!(p.display().progress, 0.0);
}

#[test]
fn stale_events_from_previous_track_are_ignored() {
    let (mut p, _) = player(2);
    p.play(None).unwrap();
    p.skip_to(1).unwrap();
    p.pump_events().unwrap();

    // Track 0's Stop arrived after track 1 became active; the wave stays on.
    assert!(p.display().wave_visible);
    assert_eq!(p.active_index(), 1);
}

#[test]
fn blocked_playback_retries_once_unlocked() {
    let (mut p, engine) = player(1);
    engine.blocked.set(true);

    p.play(None).unwrap();
    p.pump_events().unwrap();
    assert!(!p.is_playing());
    assert!(engine.track(0).borrow().unlock_requested);

    engine.unlock();
    p.pump_events().unwrap();
    assert!(p.is_playing());
    assert_eq!(engine.loads(), 1);
}

#[test]
fn end_of_track_does_not_advance_by_default() {
    let (mut p, engine) = player(2);
    p.play(None).unwrap();
    p.pump_events().unwrap();
    engine.finish(0);
    p.pump_events().unwrap();

    assert_eq!(p.active_index(), 0);
    assert!(!p.display().wave_visible);
    assert_eq!(p.transport_state(), TransportState::Stopped);
}

#[test]
fn end_of_track_advances_when_enabled() {
    let engine = MockEngine::new();
    let opts = PlayerOptions {
        auto_advance: true,
        ..PlayerOptions::default()
    };
    let mut p = PlaybackController::new(engine.clone(), vec![t("a"), t("b")], opts).unwrap();
    p.play(None).unwrap();
    engine.finish(0);
    p.pump_events().unwrap();

    assert_eq!(p.active_index(), 1);
    assert!(p.is_playing());
}

#[test]
fn shutdown_cancels_the_loop_and_stops_playback() {
    let (mut p, engine) = player(1);
    p.play(None).unwrap();
    p.pump_events().unwrap();

    p.shutdown();
    assert!(!p.frame_pending());
    assert!(!engine.track(0).borrow().playing);

    p.play(None).unwrap();
    p.pump_events().unwrap();
    assert!(!p.frame_pending());
}

#[test]
fn handles_carry_configured_load_options() {
    let engine = MockEngine::new();
    let opts = PlayerOptions {
        load: crate::engine::LoadOptions {
            looping: true,
            streaming: false,
        },
        auto_advance: false,
    };
    let mut p = PlaybackController::new(engine.clone(), vec![t("a")], opts).unwrap();
    p.play(None).unwrap();
    let track = engine.track(0);
    assert!(track.borrow().options.looping);
    assert!(!track.borrow().options.streaming);
    assert_eq!(track.borrow().path, PathBuf::from("/tmp/a.mp3"));
}

#[test]
fn progress_fraction_handles_unknown_duration() {
    assert_eq!(progress_fraction(10.0, f64::NAN), 0.0);
    assert_eq!(progress_fraction(10.0, 0.0), 0.0);
    assert_eq!(progress_fraction(0.0, 0.0), 0.0);
    assert_eq!(progress_fraction(30.0, 60.0), 0.5);
}
