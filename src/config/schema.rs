use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/showtime/config.toml` or `~/.config/showtime/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SHOWTIME__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub schedule: ScheduleSettings,
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Starting volume, `0.0..=1.0`.
    pub volume: f32,
    /// Decode from disk while playing instead of reading whole files first.
    pub streaming: bool,
    /// Loop each track instead of ending.
    pub looping: bool,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            streaming: true,
            looping: false,
            volume_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Wait for showtime when play is first pressed.
    pub enabled: bool,
    /// Which wall-clock boundary the program starts on.
    pub alignment: AlignmentSetting,
    /// How long the program runs after each boundary (seconds).
    pub window_secs: u64,
    /// How often to check the clock while waiting (milliseconds).
    pub poll_interval_ms: u64,
    /// Delay between starting a late join and seeking into it (milliseconds).
    pub settle_ms: u64,
    /// Give up on the join seek if playback has not started by then (milliseconds).
    pub settle_timeout_ms: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            alignment: AlignmentSetting::Hour,
            window_secs: 180,
            poll_interval_ms: 250,
            settle_ms: 100,
            settle_timeout_ms: 3000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentSetting {
    #[serde(alias = "top-of-hour", alias = "hourly")]
    Hour,
    #[serde(alias = "top-of-minute", alias = "minutely")]
    Minute,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Play the next track when one ends.
    pub auto_advance: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// Redraw interval (milliseconds).
    pub frame_ms: u64,
    /// Phase advance of the waveform per frame.
    pub wave_speed: f64,
    /// Waveform height as a fraction of the available rows.
    pub wave_amplitude: f64,
    /// Number of waveform periods across the screen.
    pub wave_frequency: f64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            frame_ms: 33,
            wave_speed: 0.03,
            wave_amplitude: 0.7,
            wave_frequency: 2.0,
        }
    }
}
