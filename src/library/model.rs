use std::path::PathBuf;
use std::time::Duration;

/// One playable file.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    /// What the UI shows ("Artist - Title" when tags have both).
    pub title: String,
    pub duration: Option<Duration>,
}

impl Track {
    pub fn new(path: PathBuf, title: impl Into<String>) -> Self {
        Self {
            path,
            title: title.into(),
            duration: None,
        }
    }
}
