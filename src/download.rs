//! Saving previews to disk for offline playback.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::audio::MediaLoader;
use crate::catalog::Track;
use crate::error::DownloadError;

/// Fetches a track's preview into a directory and returns the local copy.
pub struct Downloader {
    loader: Arc<dyn MediaLoader>,
    dir: PathBuf,
}

impl Downloader {
    pub fn new(loader: Arc<dyn MediaLoader>, dir: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            dir: dir.into(),
        }
    }

    /// Write the preview bytes to `<dir>/<title>-<id>.mp3` and return a new
    /// track whose preview is that path. The input track is left as is.
    pub fn download(&self, track: &Track) -> Result<Track, DownloadError> {
        let media = self
            .loader
            .load(&track.preview)
            .map_err(|e| DownloadError::Failed(e.to_string()))?;

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name(track));
        fs::write(&path, media.bytes().as_ref())?;
        info!(id = %track.id, path = %path.display(), "preview downloaded");

        Ok(track.with_preview(path.to_string_lossy()))
    }
}

/// Two tracks with the same title still get distinct files via the id suffix.
pub fn file_name(track: &Track) -> String {
    format!("{}-{}.mp3", sanitize(&track.title), sanitize(&track.id))
}

/// Replace anything outside `[A-Za-z0-9_- ]` with `_`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
