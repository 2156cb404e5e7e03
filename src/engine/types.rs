//! Engine-facing traits, notifications and small value types.
//!
//! The player never talks to an audio backend directly. It loads one
//! `EngineHandle` per track through an `AudioEngine` and learns about
//! transport changes through `EngineEvent`s delivered on a channel.

use std::path::Path;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::error::EngineError;

/// How far a handle has come in loading its source.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

/// Options passed to `AudioEngine::load`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Restart from the top instead of ending.
    pub looping: bool,
    /// Decode incrementally from disk instead of buffering the whole file.
    pub streaming: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            looping: false,
            streaming: true,
        }
    }
}

/// Transport notifications emitted by an engine handle.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Source decoded and ready.
    Load,
    /// Playback actually started.
    Play,
    Pause,
    Stop,
    /// Reached the end of the source.
    End,
    Seek,
    /// The engine refused to start playback (e.g. no output device yet).
    PlayError(String),
    /// The source could not be opened or decoded.
    LoadError(String),
    /// Playback is possible again; fired once per `once_unlocked` call.
    Unlocked,
}

/// An `EngineEvent` tagged with the playlist index of the handle that sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineNotice {
    pub track: usize,
    pub event: EngineEvent,
}

/// Per-handle event sender; the equivalent of registering callbacks.
#[derive(Debug, Clone)]
pub struct Notifier {
    track: usize,
    tx: Sender<EngineNotice>,
}

impl Notifier {
    pub fn new(track: usize, tx: Sender<EngineNotice>) -> Self {
        Self { track, tx }
    }

    pub fn track(&self) -> usize {
        self.track
    }

    /// Deliver `event`. A dropped receiver means the player is gone, so the
    /// notification is discarded.
    pub fn send(&self, event: EngineEvent) {
        let _ = self.tx.send(EngineNotice {
            track: self.track,
            event,
        });
    }
}

/// A loaded (or loading) track inside an audio engine.
pub trait EngineHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration);

    /// Current playback position.
    fn position(&self) -> Duration;
    /// Total length, once known.
    fn duration(&self) -> Option<Duration>;

    fn is_playing(&self) -> bool;
    fn is_paused(&self) -> bool;
    fn state(&self) -> LoadState;

    /// Ask for a single `EngineEvent::Unlocked` once playback becomes possible.
    fn once_unlocked(&mut self);

    /// Give the handle a chance to emit deferred notifications (end of
    /// stream, device unlocked). Called from the event loop.
    fn tick(&mut self) {}
}

/// Factory for engine handles plus the process-wide volume.
pub trait AudioEngine {
    type Handle: EngineHandle;

    fn load(
        &mut self,
        source: &Path,
        options: LoadOptions,
        notifier: Notifier,
    ) -> Result<Self::Handle, EngineError>;

    /// Set the volume applied uniformly to every handle. Expects `[0, 1]`.
    fn set_volume(&mut self, level: f32);
    fn volume(&self) -> f32;
}
