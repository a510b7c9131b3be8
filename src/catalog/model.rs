use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel shown when an album has no usable release date.
pub const UNKNOWN_DATE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub cover: String,
    /// Already formatted for display (`dd.MM.yyyy` or [`UNKNOWN_DATE`]).
    #[serde(default)]
    pub release_date: Option<String>,
}

/// A catalog track. `preview` is either a remote URL or, for downloaded
/// copies, a local file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: Artist,
    pub album: Album,
    /// Full track length in seconds.
    pub duration: u32,
    pub preview: String,
    #[serde(default)]
    pub track_position: u32,
}

impl Track {
    /// A copy of this track whose preview points at `path`.
    pub fn with_preview(&self, path: impl Into<String>) -> Track {
        Track {
            preview: path.into(),
            ..self.clone()
        }
    }

    /// "Artist - Title", falling back to the title alone.
    pub fn display(&self) -> String {
        let artist = self.artist.name.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

pub fn is_remote_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Format a catalog `yyyy-MM-dd` date as `dd.MM.yyyy`.
///
/// One-way: anything missing or unparsable becomes [`UNKNOWN_DATE`].
pub fn format_release_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return UNKNOWN_DATE.to_string();
    };
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => d.format("%d.%m.%Y").to_string(),
        Err(_) => UNKNOWN_DATE.to_string(),
    }
}

/// Format seconds as `MM:SS`.
pub fn format_duration(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
