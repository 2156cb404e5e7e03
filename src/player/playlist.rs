//! The ordered playlist, the active index and the lazily created handles.

use crate::error::{PlayerError, Result};
use crate::library::Track;

/// Direction for `PlaybackController::skip`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// A playlist slot. `handle` stays `None` until the track is first played.
pub struct PlaylistEntry<H> {
    pub track: Track,
    pub handle: Option<H>,
}

pub struct Playlist<H> {
    entries: Vec<PlaylistEntry<H>>,
    active: usize,
}

impl<H> Playlist<H> {
    /// Build a playlist. The active index starts at the first track.
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        let entries = tracks
            .into_iter()
            .map(|track| PlaylistEntry {
                track,
                handle: None,
            })
            .collect();
        Ok(Self { entries, active: 0 })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_valid_index(&self, index: usize) -> bool {
        index < self.entries.len()
    }

    /// `Ok(index)` when it points at a track, `InvalidIndex` otherwise.
    pub fn check_index(&self, index: usize) -> Result<usize> {
        if self.is_valid_index(index) {
            Ok(index)
        } else {
            Err(PlayerError::InvalidIndex {
                index,
                len: self.entries.len(),
            })
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub(crate) fn set_active(&mut self, index: usize) -> Result<()> {
        self.active = self.check_index(index)?;
        Ok(())
    }

    /// Index one step from the active track, wrapping at both ends.
    pub fn step_from_active(&self, direction: Direction) -> usize {
        let len = self.entries.len();
        match direction {
            Direction::Next => (self.active + 1) % len,
            Direction::Prev => (self.active + len - 1) % len,
        }
    }

    pub fn next_index(&self) -> usize {
        self.step_from_active(Direction::Next)
    }

    pub fn prev_index(&self) -> usize {
        self.step_from_active(Direction::Prev)
    }

    pub fn entry(&self, index: usize) -> Option<&PlaylistEntry<H>> {
        self.entries.get(index)
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<&mut PlaylistEntry<H>> {
        self.entries.get_mut(index)
    }

    pub fn active_entry(&self) -> &PlaylistEntry<H> {
        &self.entries[self.active]
    }

    pub fn active_handle(&self) -> Option<&H> {
        self.entries[self.active].handle.as_ref()
    }

    pub(crate) fn active_handle_mut(&mut self) -> Option<&mut H> {
        self.entries[self.active].handle.as_mut()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.entries.iter().map(|e| &e.track)
    }

    pub(crate) fn handles_mut(&mut self) -> impl Iterator<Item = &mut H> {
        self.entries.iter_mut().filter_map(|e| e.handle.as_mut())
    }
}
