//! Error types shared by the engine, the player and the schedule gate.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by an audio engine while loading a track.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("audio device unavailable: {0}")]
    Device(String),
}

/// Malformed scheduling input.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    /// A manual offset must be a finite, non-negative number of seconds.
    #[error("invalid start offset: {0} (expected a finite number of seconds >= 0)")]
    InvalidOffset(f64),

    #[error("invalid show window: {window_secs}s does not fit a {period_secs}s alignment period")]
    InvalidWindow { window_secs: u64, period_secs: u64 },

    /// The aligned boundary could not be represented (out-of-range date math).
    #[error("cannot compute showtime boundary: {0}")]
    Boundary(String),
}

/// Errors surfaced by the playback controller.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("track index {index} out of range (playlist has {len} tracks)")]
    InvalidIndex { index: usize, len: usize },

    #[error("playlist is empty")]
    EmptyPlaylist,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
