use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::{
    AudioEngine, EngineEvent, EngineHandle, EngineNotice, LoadOptions, LoadState, Notifier,
};
use crate::error::{PlayerError, Result};
use crate::format::format_time;
use crate::library::Track;

use super::display::DisplayState;
use super::playlist::{Direction, Playlist};
use super::progress::{FrameLoop, progress_fraction};

/// Transport state of the active track, read from its engine handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct PlayerOptions {
    pub load: LoadOptions,
    /// Move on to the next track when one ends.
    pub auto_advance: bool,
}

/// Play/pause/skip/seek over a playlist, driven by engine notifications.
///
/// The engine owns transport state; the controller only keeps the playlist
/// position and the display snapshot, and never caches whether something is
/// playing.
pub struct PlaybackController<E: AudioEngine> {
    engine: E,
    playlist: Playlist<E::Handle>,
    options: PlayerOptions,
    events_tx: Sender<EngineNotice>,
    events_rx: Receiver<EngineNotice>,
    frames: FrameLoop,
    display: DisplayState,
}

impl<E: AudioEngine> PlaybackController<E> {
    pub fn new(engine: E, tracks: Vec<Track>, options: PlayerOptions) -> Result<Self> {
        let playlist = Playlist::new(tracks)?;
        let (events_tx, events_rx) = mpsc::channel();
        let display = DisplayState {
            title: playlist.active_entry().track.title.clone(),
            volume: engine.volume(),
            ..DisplayState::default()
        };

        Ok(Self {
            engine,
            playlist,
            options,
            events_tx,
            events_rx,
            frames: FrameLoop::default(),
            display,
        })
    }

    /// Play the track at `index`, or the active track when `None`.
    ///
    /// The engine handle is created on the first play of a track and reused
    /// afterwards. Progress updates start once the engine reports `Play`.
    pub fn play(&mut self, index: Option<usize>) -> Result<()> {
        let index = self
            .playlist
            .check_index(index.unwrap_or(self.playlist.active()))?;

        if index != self.playlist.active() {
            if let Some(current) = self.playlist.active_handle_mut() {
                if current.is_playing() || current.is_paused() {
                    current.stop();
                }
            }
        }

        let len = self.playlist.len();
        let entry = self
            .playlist
            .entry_mut(index)
            .ok_or(PlayerError::InvalidIndex { index, len })?;

        if entry.handle.is_none() {
            let notifier = Notifier::new(index, self.events_tx.clone());
            let handle = self
                .engine
                .load(&entry.track.path, self.options.load, notifier)?;
            debug!(index, title = %entry.track.title, "loaded engine handle");
            entry.handle = Some(handle);
        }

        let mut loaded = false;
        if let Some(handle) = entry.handle.as_mut() {
            handle.play();
            loaded = handle.state() == LoadState::Loaded;
        }

        self.display.title = entry.track.title.clone();
        self.display.pause_visible = loaded;
        self.display.loading_visible = !loaded;

        self.playlist.set_active(index)?;
        info!(index, "play");
        Ok(())
    }

    /// Pause the active track. Nothing to do if it was never loaded.
    pub fn pause(&mut self) {
        if let Some(handle) = self.playlist.active_handle_mut() {
            handle.pause();
        }
        self.display.pause_visible = false;
    }

    pub fn skip(&mut self, direction: Direction) -> Result<()> {
        let index = self.playlist.step_from_active(direction);
        self.skip_to(index)
    }

    /// Stop the active track, reset the progress readout and play `index`.
    pub fn skip_to(&mut self, index: usize) -> Result<()> {
        self.playlist.check_index(index)?;

        if let Some(handle) = self.playlist.active_handle_mut() {
            handle.stop();
        }
        self.display.reset_progress();

        self.play(Some(index))
    }

    /// Set the engine-wide volume, clamped into `[0, 1]`.
    pub fn set_volume(&mut self, level: f32) {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.engine.set_volume(level);
        self.display.volume = level;
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    /// Seek to a fraction of the active track. Only while it is playing.
    pub fn seek_to_fraction(&mut self, fraction: f64) -> bool {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let Some(duration) = self.active_duration() else {
            debug!(fraction, "seek ignored: duration unknown");
            return false;
        };
        let Some(handle) = self.playing_handle_mut() else {
            debug!(fraction, "seek ignored: not playing");
            return false;
        };
        handle.seek(duration.mul_f64(fraction));
        true
    }

    /// Seek to `seconds` into the active track. Only while it is playing.
    pub fn seek_to_seconds(&mut self, seconds: f64) -> bool {
        let seconds = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        let Some(handle) = self.playing_handle_mut() else {
            debug!(seconds, "seek ignored: not playing");
            return false;
        };
        handle.seek(Duration::from_secs_f64(seconds));
        true
    }

    /// Elapsed time of the active track, only while it is playing.
    pub fn current_position_formatted(&self) -> Option<String> {
        self.playlist
            .active_handle()
            .filter(|h| h.is_playing())
            .map(|h| format_time(h.position().as_secs_f64().round()))
    }

    pub fn transport_state(&self) -> TransportState {
        let Some(handle) = self.playlist.active_handle() else {
            return TransportState::Idle;
        };
        match handle.state() {
            LoadState::Unloaded => TransportState::Idle,
            LoadState::Loading => TransportState::Loading,
            LoadState::Loaded if handle.is_playing() => TransportState::Playing,
            LoadState::Loaded if handle.is_paused() => TransportState::Paused,
            LoadState::Loaded => TransportState::Stopped,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playlist.active_handle().is_some_and(|h| h.is_playing())
    }

    pub fn active_index(&self) -> usize {
        self.playlist.active()
    }

    pub fn playlist(&self) -> &Playlist<E::Handle> {
        &self.playlist
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Drain pending engine notifications.
    pub fn pump_events(&mut self) -> Result<()> {
        while let Ok(notice) = self.events_rx.try_recv() {
            self.on_engine_event(notice)?;
        }
        Ok(())
    }

    /// Let every loaded handle emit deferred notifications.
    pub fn tick(&mut self) {
        for handle in self.playlist.handles_mut() {
            handle.tick();
        }
    }

    /// Run one progress step if one was requested. Returns whether it ran.
    pub fn on_frame(&mut self) -> bool {
        if !self.frames.take() {
            return false;
        }
        let Some(handle) = self.playlist.active_handle() else {
            return false;
        };

        let seek = handle.position().as_secs_f64();
        let duration = self.active_duration().map_or(f64::NAN, |d| d.as_secs_f64());
        self.display.timer = format_time(seek.round());
        self.display.progress = progress_fraction(seek, duration);

        if handle.is_playing() {
            self.frames.request();
        }
        true
    }

    pub fn frame_pending(&self) -> bool {
        self.frames.is_pending()
    }

    /// Stop the progress loop for good and silence the active track.
    pub fn shutdown(&mut self) {
        self.frames.cancel();
        if let Some(handle) = self.playlist.active_handle_mut() {
            if handle.is_playing() || handle.is_paused() {
                handle.stop();
            }
        }
    }

    /// The engine's duration, or the one read from tags when the decoder
    /// cannot tell.
    fn active_duration(&self) -> Option<Duration> {
        let entry = self.playlist.active_entry();
        entry
            .handle
            .as_ref()
            .and_then(|h| h.duration())
            .or(entry.track.duration)
    }

    fn playing_handle_mut(&mut self) -> Option<&mut E::Handle> {
        self.playlist.active_handle_mut().filter(|h| h.is_playing())
    }

    fn on_engine_event(&mut self, notice: EngineNotice) -> Result<()> {
        if notice.track != self.playlist.active() {
            debug!(track = notice.track, event = ?notice.event, "ignoring inactive track event");
            return Ok(());
        }

        match notice.event {
            EngineEvent::Load => {
                self.display.wave_visible = true;
                self.display.loading_visible = false;
            }
            EngineEvent::Play => {
                let secs = self.active_duration().map_or(0.0, |d| d.as_secs_f64());
                self.display.duration = format_time(secs.round());
                self.display.wave_visible = true;
                self.display.loading_visible = false;
                self.display.pause_visible = true;
                self.frames.request();
            }
            EngineEvent::Pause | EngineEvent::Stop => {
                self.display.wave_visible = false;
            }
            EngineEvent::End => {
                self.display.wave_visible = false;
                self.display.pause_visible = false;
                if self.options.auto_advance {
                    info!(track = notice.track, "track ended, advancing");
                    self.skip(Direction::Next)?;
                }
            }
            EngineEvent::Seek => {
                self.frames.request();
            }
            EngineEvent::PlayError(reason) => {
                warn!(track = notice.track, %reason, "playback blocked, retrying once unlocked");
                if let Some(handle) = self.playlist.active_handle_mut() {
                    handle.once_unlocked();
                }
            }
            EngineEvent::LoadError(reason) => {
                warn!(track = notice.track, %reason, "track failed to load");
                self.display.loading_visible = false;
                self.display.pause_visible = false;
            }
            EngineEvent::Unlocked => {
                info!(track = notice.track, "engine unlocked, retrying play");
                if let Some(handle) = self.playlist.active_handle_mut() {
                    handle.play();
                }
            }
        }
        Ok(())
    }
}
