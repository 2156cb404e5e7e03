use std::path::Path;

use crate::config;
use crate::error::ScheduleError;
use crate::schedule::ShowWindow;

/// Load settings, falling back to defaults when the config cannot be used.
///
/// A show window that does not fit its alignment period is an error rather
/// than a fallback.
pub fn load_settings(config_override: Option<&Path>) -> Result<config::Settings, ScheduleError> {
    settle(config::Settings::load(config_override))
}

pub(super) fn settle(
    loaded: Result<config::Settings, ::config::ConfigError>,
) -> Result<config::Settings, ScheduleError> {
    match loaded {
        Ok(s) => {
            ShowWindow::from_settings(&s.schedule)?;
            if let Err(msg) = s.validate() {
                eprintln!("showtime: invalid config, using defaults: {msg}");
                Ok(config::Settings::default())
            } else {
                Ok(s)
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("showtime: failed to load config, using defaults: {e}");
            Ok(config::Settings::default())
        }
    }
}
