use std::{
    env,
    path::{Path, PathBuf},
};

use super::schema::{AlignmentSetting, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `SHOWTIME__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and an optional config file.
    ///
    /// `config_override` (from `--config`) wins over `SHOWTIME_CONFIG_PATH` and
    /// the XDG default.
    pub fn load(config_override: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let config_path = config_override
            .map(Path::to_path_buf)
            .or_else(resolve_config_path);

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            // An explicitly named file must exist; the default one is optional.
            builder = builder
                .add_source(::config::File::from(path.as_path()).required(config_override.is_some()));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SHOWTIME")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let period = match self.schedule.alignment {
            AlignmentSetting::Hour => 3600,
            AlignmentSetting::Minute => 60,
        };
        if self.schedule.window_secs == 0 {
            return Err("schedule.window_secs must be >= 1".to_string());
        }
        if self.schedule.window_secs > period {
            return Err(format!(
                "schedule.window_secs ({}) must not exceed the alignment period ({period}s)",
                self.schedule.window_secs
            ));
        }
        if self.schedule.poll_interval_ms == 0 {
            return Err("schedule.poll_interval_ms must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err("audio.volume must be between 0.0 and 1.0".to_string());
        }
        if self.ui.frame_ms == 0 {
            return Err("ui.frame_ms must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `SHOWTIME_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SHOWTIME_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/showtime/config.toml`
/// or `~/.config/showtime/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("showtime").join("config.toml"))
}
