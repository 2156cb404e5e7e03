//! Oscillating waveform shown while a track is playing.

use std::f64::consts::{PI, TAU};

use crate::config::UiSettings;

/// How quickly the amplitude eases toward its target each frame.
const EASE: f64 = 0.15;

/// A sine wave tapered at both ends whose phase advances once per frame.
///
/// `stop` does not flatten the wave at once: the amplitude eases to zero
/// over the following frames, and `start` eases it back up.
#[derive(Debug, Clone)]
pub struct Wave {
    speed: f64,
    amplitude: f64,
    frequency: f64,
    phase: f64,
    level: f64,
    running: bool,
    width: u16,
    height: u16,
}

impl Wave {
    pub fn new(settings: &UiSettings) -> Self {
        Self {
            speed: settings.wave_speed,
            amplitude: settings.wave_amplitude.clamp(0.0, 1.0),
            frequency: settings.wave_frequency.max(0.0),
            phase: 0.0,
            level: 0.0,
            running: false,
            width: 0,
            height: 0,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Match the drawing area, in terminal cells.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Move the animation one frame forward.
    pub fn advance(&mut self) {
        let target = if self.running { self.amplitude } else { 0.0 };
        self.level += (target - self.level) * EASE;
        if (target - self.level).abs() < 1e-3 {
            self.level = target;
        }
        if self.level > 0.0 {
            self.phase = (self.phase + self.speed * TAU) % TAU;
        }
    }

    /// Current amplitude, in `[0, amplitude]`.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Height at `x` in `[0, 1]`, in `[-1, 1]`.
    pub fn sample(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        let taper = (PI * x).sin();
        self.level * taper * (TAU * self.frequency * x + self.phase).sin()
    }

    /// One point per braille column across the current width.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let columns = usize::from(self.width) * 2;
        if columns < 2 || self.height == 0 {
            return Vec::new();
        }
        let last = (columns - 1) as f64;
        (0..columns)
            .map(|i| {
                let x = i as f64 / last;
                (x, self.sample(x))
            })
            .collect()
    }
}
