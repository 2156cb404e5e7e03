//! `rodio` implementation of the engine traits.
//!
//! All handles share one lazily opened output stream. While the stream
//! cannot be opened, `play` reports `EngineEvent::PlayError` and handles that
//! asked for `once_unlocked` retry opening it on every `tick`.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info, warn};

use crate::error::EngineError;

use super::types::{AudioEngine, EngineEvent, EngineHandle, LoadOptions, LoadState, Notifier};

/// The shared output stream plus the engine-wide volume.
struct OutputDevice {
    stream: RefCell<Option<OutputStream>>,
    volume: Cell<f32>,
    sinks: RefCell<Vec<Weak<Sink>>>,
}

impl OutputDevice {
    fn new(volume: f32) -> Self {
        Self {
            stream: RefCell::new(None),
            volume: Cell::new(volume),
            sinks: RefCell::new(Vec::new()),
        }
    }

    /// Open the default stream if it is not open yet.
    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.stream.borrow().is_some() {
            return Ok(());
        }

        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Device(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        info!("audio output device opened");
        *self.stream.borrow_mut() = Some(stream);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.borrow().is_some()
    }

    /// Create a paused sink on the shared mixer at the engine volume.
    fn new_sink(&self) -> Result<Rc<Sink>, EngineError> {
        self.ensure_open()?;
        let stream = self.stream.borrow();
        let Some(stream) = stream.as_ref() else {
            return Err(EngineError::Device("output stream closed".to_string()));
        };

        let sink = Rc::new(Sink::connect_new(stream.mixer()));
        sink.pause();
        sink.set_volume(self.volume.get());

        let mut sinks = self.sinks.borrow_mut();
        sinks.retain(|s| s.strong_count() > 0);
        sinks.push(Rc::downgrade(&sink));
        Ok(sink)
    }

    fn set_volume(&self, level: f32) {
        self.volume.set(level);
        self.sinks.borrow_mut().retain(|s| match s.upgrade() {
            Some(sink) => {
                sink.set_volume(level);
                true
            }
            None => false,
        });
    }
}

/// Engine backed by the system's default output device.
pub struct RodioEngine {
    device: Rc<OutputDevice>,
}

impl RodioEngine {
    /// Create the engine. The output device is opened on first playback.
    pub fn new(volume: f32) -> Self {
        Self {
            device: Rc::new(OutputDevice::new(volume.clamp(0.0, 1.0))),
        }
    }
}

impl AudioEngine for RodioEngine {
    type Handle = RodioHandle;

    fn load(
        &mut self,
        source: &Path,
        options: LoadOptions,
        notifier: Notifier,
    ) -> Result<Self::Handle, EngineError> {
        // Fail fast on missing files; decoding waits for the first play.
        File::open(source).map_err(|e| EngineError::Open {
            path: source.to_path_buf(),
            source: e,
        })?;
        debug!(track = notifier.track(), path = ?source, "engine handle created");

        Ok(RodioHandle {
            path: source.to_path_buf(),
            options,
            device: Rc::clone(&self.device),
            notifier,
            sink: None,
            duration: None,
            state: LoadState::Unloaded,
            unlock_requested: false,
        })
    }

    fn set_volume(&mut self, level: f32) {
        self.device.set_volume(level);
    }

    fn volume(&self) -> f32 {
        self.device.volume.get()
    }
}

/// One track's playback state inside `RodioEngine`.
pub struct RodioHandle {
    path: PathBuf,
    options: LoadOptions,
    device: Rc<OutputDevice>,
    notifier: Notifier,
    sink: Option<Rc<Sink>>,
    duration: Option<Duration>,
    state: LoadState,
    unlock_requested: bool,
}

impl RodioHandle {
    /// Decode the file into a fresh paused sink.
    fn build_sink(&mut self) -> Result<Rc<Sink>, EngineError> {
        let sink = self.device.new_sink()?;

        let file = File::open(&self.path).map_err(|e| EngineError::Open {
            path: self.path.clone(),
            source: e,
        })?;
        let decode_err = |e: rodio::decoder::DecoderError| EngineError::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        };

        if self.options.streaming {
            let source = Decoder::new(BufReader::new(file)).map_err(decode_err)?;
            self.duration = source.total_duration().or(self.duration);
            sink.append(source);
        } else {
            let mut bytes = Vec::new();
            BufReader::new(file)
                .read_to_end(&mut bytes)
                .map_err(|e| EngineError::Open {
                    path: self.path.clone(),
                    source: e,
                })?;
            let source = Decoder::new(Cursor::new(bytes)).map_err(decode_err)?;
            self.duration = source.total_duration().or(self.duration);
            sink.append(source);
        }

        Ok(sink)
    }

    fn release_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

impl EngineHandle for RodioHandle {
    fn play(&mut self) {
        if self.sink.is_none() {
            if !self.device.is_open() {
                if let Err(e) = self.device.ensure_open() {
                    warn!(track = self.notifier.track(), error = %e, "playback blocked");
                    self.notifier.send(EngineEvent::PlayError(e.to_string()));
                    return;
                }
            }

            let first_load = self.state != LoadState::Loaded;
            self.state = LoadState::Loading;
            match self.build_sink() {
                Ok(sink) => {
                    self.sink = Some(sink);
                    self.state = LoadState::Loaded;
                    if first_load {
                        self.notifier.send(EngineEvent::Load);
                    }
                }
                Err(e) => {
                    self.state = LoadState::Unloaded;
                    warn!(track = self.notifier.track(), error = %e, "load failed");
                    self.notifier.send(EngineEvent::LoadError(e.to_string()));
                    return;
                }
            }
        }

        if let Some(sink) = self.sink.as_ref() {
            sink.play();
            self.notifier.send(EngineEvent::Play);
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            if !sink.is_paused() {
                sink.pause();
                self.notifier.send(EngineEvent::Pause);
            }
        }
    }

    fn stop(&mut self) {
        if self.sink.is_some() {
            self.release_sink();
            self.notifier.send(EngineEvent::Stop);
        }
    }

    fn seek(&mut self, position: Duration) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        let target = self.duration.map_or(position, |d| position.min(d));
        match sink.try_seek(target) {
            Ok(()) => self.notifier.send(EngineEvent::Seek),
            Err(e) => warn!(track = self.notifier.track(), error = %e, "seek failed"),
        }
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, |s| s.get_pos())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && !s.empty())
    }

    fn is_paused(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| s.is_paused() && !s.empty())
    }

    fn state(&self) -> LoadState {
        self.state
    }

    fn once_unlocked(&mut self) {
        self.unlock_requested = true;
    }

    fn tick(&mut self) {
        if self.unlock_requested && self.device.ensure_open().is_ok() {
            self.unlock_requested = false;
            self.notifier.send(EngineEvent::Unlocked);
        }

        let ended = self
            .sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && s.empty());
        if !ended {
            return;
        }

        self.release_sink();
        if self.options.looping {
            debug!(track = self.notifier.track(), "looping");
            self.play();
        } else {
            self.notifier.send(EngineEvent::End);
        }
    }
}
