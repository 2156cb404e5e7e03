//! In-memory engine used by the player and schedule tests.
//!
//! Everything happens synchronously: `play` emits `Load`/`Play` right away
//! unless the engine is blocked, in which case it emits `PlayError` and waits
//! for `MockEngine::unlock`.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::error::EngineError;

use super::types::{AudioEngine, EngineEvent, EngineHandle, LoadOptions, LoadState, Notifier};

#[derive(Debug)]
pub struct MockTrack {
    pub id: usize,
    pub path: PathBuf,
    pub options: LoadOptions,
    pub state: LoadState,
    pub playing: bool,
    pub paused: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub plays: usize,
    pub stops: usize,
    pub seeks: Vec<Duration>,
    pub unlock_requested: bool,
    notifier: Notifier,
}

#[derive(Clone)]
pub struct MockEngine {
    pub tracks: Rc<RefCell<Vec<Rc<RefCell<MockTrack>>>>>,
    pub volumes: Rc<RefCell<Vec<f32>>>,
    pub blocked: Rc<Cell<bool>>,
    pub duration: Duration,
    volume: Rc<Cell<f32>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            tracks: Rc::new(RefCell::new(Vec::new())),
            volumes: Rc::new(RefCell::new(Vec::new())),
            blocked: Rc::new(Cell::new(false)),
            duration: Duration::from_secs(180),
            volume: Rc::new(Cell::new(1.0)),
        }
    }

    pub fn loads(&self) -> usize {
        self.tracks.borrow().len()
    }

    /// State of the `n`th handle ever loaded.
    pub fn track(&self, n: usize) -> Rc<RefCell<MockTrack>> {
        Rc::clone(&self.tracks.borrow()[n])
    }

    /// Lift the autoplay block and notify handles that asked for it.
    pub fn unlock(&self) {
        self.blocked.set(false);
        for t in self.tracks.borrow().iter() {
            let mut t = t.borrow_mut();
            if t.unlock_requested {
                t.unlock_requested = false;
                t.notifier.send(EngineEvent::Unlocked);
            }
        }
    }

    /// Move the playhead of the `n`th loaded handle.
    pub fn set_position(&self, n: usize, position: Duration) {
        self.track(n).borrow_mut().position = position;
    }

    /// Finish the `n`th loaded handle as if the source ran out.
    pub fn finish(&self, n: usize) {
        let track = self.track(n);
        let mut t = track.borrow_mut();
        t.playing = false;
        t.paused = false;
        t.position = Duration::ZERO;
        t.notifier.send(EngineEvent::End);
    }
}

impl AudioEngine for MockEngine {
    type Handle = MockHandle;

    fn load(
        &mut self,
        source: &Path,
        options: LoadOptions,
        notifier: Notifier,
    ) -> Result<Self::Handle, EngineError> {
        let id = self.tracks.borrow().len();
        let track = Rc::new(RefCell::new(MockTrack {
            id,
            path: source.to_path_buf(),
            options,
            state: LoadState::Unloaded,
            playing: false,
            paused: false,
            position: Duration::ZERO,
            duration: Some(self.duration),
            plays: 0,
            stops: 0,
            seeks: Vec::new(),
            unlock_requested: false,
            notifier,
        }));
        self.tracks.borrow_mut().push(Rc::clone(&track));
        Ok(MockHandle {
            track,
            blocked: Rc::clone(&self.blocked),
        })
    }

    fn set_volume(&mut self, level: f32) {
        self.volumes.borrow_mut().push(level);
        self.volume.set(level);
    }

    fn volume(&self) -> f32 {
        self.volume.get()
    }
}

pub struct MockHandle {
    pub track: Rc<RefCell<MockTrack>>,
    blocked: Rc<Cell<bool>>,
}

impl MockHandle {
    pub fn id(&self) -> usize {
        self.track.borrow().id
    }
}

impl EngineHandle for MockHandle {
    fn play(&mut self) {
        let mut t = self.track.borrow_mut();
        if self.blocked.get() {
            t.notifier.send(EngineEvent::PlayError("blocked".to_string()));
            return;
        }
        if t.state != LoadState::Loaded {
            t.state = LoadState::Loaded;
            t.notifier.send(EngineEvent::Load);
        }
        t.playing = true;
        t.paused = false;
        t.plays += 1;
        t.notifier.send(EngineEvent::Play);
    }

    fn pause(&mut self) {
        let mut t = self.track.borrow_mut();
        if t.playing {
            t.playing = false;
            t.paused = true;
            t.notifier.send(EngineEvent::Pause);
        }
    }

    fn stop(&mut self) {
        let mut t = self.track.borrow_mut();
        t.playing = false;
        t.paused = false;
        t.position = Duration::ZERO;
        t.stops += 1;
        t.notifier.send(EngineEvent::Stop);
    }

    fn seek(&mut self, position: Duration) {
        let mut t = self.track.borrow_mut();
        t.position = position;
        t.seeks.push(position);
        t.notifier.send(EngineEvent::Seek);
    }

    fn position(&self) -> Duration {
        self.track.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        self.track.borrow().duration
    }

    fn is_playing(&self) -> bool {
        self.track.borrow().playing
    }

    fn is_paused(&self) -> bool {
        self.track.borrow().paused
    }

    fn state(&self) -> LoadState {
        self.track.borrow().state
    }

    fn once_unlocked(&mut self) {
        self.track.borrow_mut().unlock_requested = true;
    }
}
