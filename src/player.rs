//! Playback controller and the playlist state it drives.
//!
//! The controller is single-threaded: engine notifications are queued on a
//! channel and applied by `PlaybackController::pump_events`, and the
//! progress readout advances one step per `on_frame` call.

mod controller;
mod display;
mod playlist;
mod progress;

pub use controller::{PlaybackController, PlayerOptions, TransportState};
pub use display::DisplayState;
pub use playlist::{Direction, Playlist, PlaylistEntry};
pub use progress::progress_fraction;

#[cfg(test)]
mod tests;
