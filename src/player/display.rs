use crate::format::format_time;

/// What the UI shows. Written by the controller, read by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub title: String,
    pub timer: String,
    pub duration: String,
    /// Playhead as a fraction of the track, in `[0, 1]`.
    pub progress: f64,
    /// Waveform animation shown instead of the flat bar.
    pub wave_visible: bool,
    pub loading_visible: bool,
    /// Show the pause control (true) or the play control (false).
    pub pause_visible: bool,
    pub volume: f32,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            title: String::new(),
            timer: format_time(0.0),
            duration: format_time(0.0),
            progress: 0.0,
            wave_visible: false,
            loading_visible: false,
            pause_visible: false,
            volume: 1.0,
        }
    }
}

impl DisplayState {
    pub fn reset_progress(&mut self) {
        self.progress = 0.0;
        self.timer = format_time(0.0);
    }
}
