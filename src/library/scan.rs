use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

pub(super) fn make_title(title: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim) {
        Some(a) if !a.is_empty() => format!("{} - {}", a, title.trim()),
        _ => title.trim().to_string(),
    }
}

/// Read title/artist tags and the duration; fall back to the file stem.
fn read_track(path: &Path) -> Track {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let mut title = stem;
    let mut artist: Option<String> = None;
    let mut duration: Option<Duration> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration = Some(tagged.properties().duration());
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    if !v.trim().is_empty() {
                        title = v.to_string();
                    }
                }
                artist = tag.artist().map(|v| v.to_string());
            }
        }
        Err(e) => debug!(path = ?path, error = %e, "no readable tags"),
    }

    Track {
        path: path.to_path_buf(),
        title: make_title(&title, artist.as_deref()),
        duration,
    }
}

/// Collect the audio files under `dir`, sorted case-insensitively by title.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            tracks.push(read_track(path));
        }
    }

    tracks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    tracks
}

/// Build a playlist from command-line paths.
///
/// Files are kept in the order given, whatever their extension; directories
/// are scanned and appended in place. Missing paths are skipped with a
/// warning.
pub fn collect(paths: &[impl AsRef<Path>], settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks = Vec::new();
    for p in paths {
        let p = p.as_ref();
        if p.is_dir() {
            tracks.extend(scan(p, settings));
        } else if p.is_file() {
            tracks.push(read_track(p));
        } else {
            warn!(path = ?p, "skipping missing path");
        }
    }
    tracks
}
