use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CatalogSettings;
use crate::error::CatalogError;

use super::dto::{ChartDto, ErrorBodyDto, NO_DATA, TrackDto, TrackListDto};
use super::model::Track;

/// Read access to the remote music catalog.
///
/// Implementations block; callers run them off the UI thread.
pub trait Catalog: Send + Sync {
    fn top_tracks(&self) -> Result<Vec<Track>, CatalogError>;
    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError>;
    fn track_by_id(&self, id: &str) -> Result<Track, CatalogError>;
}

/// Blocking client for the public Deezer API.
pub struct DeezerClient {
    http: Client,
    base_url: String,
}

impl DeezerClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| CatalogError::Unknown(e.to_string()))?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "catalog request");
        let body = self
            .http
            .get(&url)
            .query(query)
            .send()?
            .error_for_status()?
            .text()?;
        parse_body(&body)
    }
}

impl Catalog for DeezerClient {
    fn top_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        let chart: ChartDto = self.get("chart", &[])?;
        non_empty(chart.tracks)
    }

    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        if query.trim().is_empty() {
            return Err(CatalogError::NoResults);
        }
        let list: TrackListDto = self.get("search", &[("q", query.trim())])?;
        non_empty(list)
    }

    fn track_by_id(&self, id: &str) -> Result<Track, CatalogError> {
        let dto: TrackDto = self.get(&format!("track/{id}"), &[])?;
        Ok(dto.into_track(true))
    }
}

/// Decode a catalog body, mapping Deezer's in-band error object first.
pub(super) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    if let Ok(err) = serde_json::from_str::<ErrorBodyDto>(body) {
        return Err(if err.error.code == NO_DATA {
            CatalogError::NoResults
        } else {
            CatalogError::ServerError(err.error.message)
        });
    }
    serde_json::from_str(body).map_err(|e| CatalogError::Unknown(format!("malformed catalog response: {e}")))
}

pub(super) fn non_empty(list: TrackListDto) -> Result<Vec<Track>, CatalogError> {
    let tracks: Vec<Track> = list.data.into_iter().map(|t| t.into_track(false)).collect();
    if tracks.is_empty() {
        Err(CatalogError::NoResults)
    } else {
        Ok(tracks)
    }
}
