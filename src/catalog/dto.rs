//! Wire shapes of the Deezer JSON API.

use serde::{Deserialize, Deserializer};

use super::model::{Album, Artist, Track, format_release_date};

/// Deezer ids are JSON numbers (negative for user uploads); accept strings too.
fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(i64),
        Str(String),
    }
    Ok(match RawId::deserialize(d)? {
        RawId::Num(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct ArtistDto {
    #[serde(deserialize_with = "de_id")]
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AlbumDto {
    #[serde(deserialize_with = "de_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    cover_big: String,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TrackDto {
    #[serde(deserialize_with = "de_id")]
    id: String,
    title: String,
    #[serde(default)]
    duration: u32,
    #[serde(default)]
    preview: String,
    #[serde(default)]
    track_position: u32,
    artist: ArtistDto,
    album: AlbumDto,
}

impl TrackDto {
    /// List entries (chart, search) carry no release date; the detail
    /// endpoint does, and it is formatted for display here.
    pub(super) fn into_track(self, detailed: bool) -> Track {
        let release_date = if detailed {
            Some(format_release_date(self.album.release_date.as_deref()))
        } else {
            None
        };
        Track {
            id: self.id,
            title: self.title,
            artist: Artist {
                id: self.artist.id,
                name: self.artist.name,
            },
            album: Album {
                id: self.album.id,
                title: self.album.title,
                cover: self.album.cover_big,
                release_date,
            },
            duration: self.duration,
            preview: self.preview,
            track_position: self.track_position,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TrackListDto {
    #[serde(default)]
    pub(super) data: Vec<TrackDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartDto {
    pub(super) tracks: TrackListDto,
}

/// Deezer reports failures as `200 OK` with an `error` object.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    pub(super) error: ErrorDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDto {
    #[serde(default)]
    pub(super) code: u32,
    #[serde(default)]
    pub(super) message: String,
}

/// Deezer's "no data" error code.
pub(super) const NO_DATA: u32 = 800;
