//! Error types shared across the crate.
//!
//! Catalog and download failures are recovered at the session boundary and
//! turned into notices; engine failures become events; store failures are
//! logged by the registry and never surface to callers.

use thiserror::Error;

/// Failure of a catalog request, classified for user-facing messaging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The request succeeded but matched nothing.
    #[error("no tracks found")]
    NoResults,

    /// The catalog could not be reached.
    #[error("no network connection")]
    NoConnectivity,

    /// The catalog answered with an error status or error body.
    #[error("catalog server error: {0}")]
    ServerError(String),

    /// Anything else (malformed body, unexpected client failure).
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl CatalogError {
    /// Human-readable message shown in place of a result list.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoResults => "Nothing matched your request.",
            Self::NoConnectivity => "No internet connection. Check your network and retry.",
            Self::ServerError(_) => "The music catalog is having trouble. Try again later.",
            Self::Unknown(_) => "Something went wrong.",
        }
    }

    /// Key of the illustration rendered next to the message.
    pub fn illustration(&self) -> &'static str {
        match self {
            Self::NoResults => "no_results",
            Self::NoConnectivity => "no_connectivity",
            Self::ServerError(_) => "server_error",
            Self::Unknown(_) => "unknown_error",
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::NoConnectivity
        } else if let Some(status) = e.status() {
            Self::ServerError(format!("HTTP {status}"))
        } else if e.is_decode() {
            Self::Unknown(format!("malformed catalog response: {e}"))
        } else {
            Self::Unknown(e.to_string())
        }
    }
}

/// Failure of a preview download.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    #[error("download failed: {0}")]
    Failed(String),
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Failed(e.to_string())
    }
}

/// Failure inside the playback engine or its collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Fetching media bytes failed.
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    /// Bytes were fetched but could not be turned into a playable voice.
    #[error("failed to prepare {url}: {reason}")]
    PrepareFailed { url: String, reason: String },

    /// No audio output device could be opened.
    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// Failure of the durable key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
