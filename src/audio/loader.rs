use std::fs;
use std::time::Duration;

use crate::catalog::is_remote_url;
use crate::error::EngineError;

use super::backend::{Media, MediaLoader};

/// Loads previews over HTTP, or from disk for downloaded tracks.
pub struct PreviewLoader {
    http: reqwest::blocking::Client,
}

impl PreviewLoader {
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Output(format!("http client: {e}")))?;
        Ok(Self { http })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.http.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

impl MediaLoader for PreviewLoader {
    fn load(&self, url: &str) -> Result<Media, EngineError> {
        let bytes = if is_remote_url(url) {
            self.fetch(url).map_err(|e| EngineError::Load {
                url: url.to_string(),
                reason: e.to_string(),
            })?
        } else {
            fs::read(url).map_err(|e| EngineError::Load {
                url: url.to_string(),
                reason: e.to_string(),
            })?
        };
        tracing::debug!(url, len = bytes.len(), "media loaded");
        Ok(Media::new(url, bytes))
    }
}
