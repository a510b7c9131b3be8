use crate::error::{CatalogError, DownloadError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A user-facing status line, optionally with an illustration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub illustration: Option<&'static str>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            illustration: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            illustration: None,
        }
    }
}

impl From<&CatalogError> for Notice {
    fn from(e: &CatalogError) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: e.message().to_string(),
            illustration: Some(e.illustration()),
        }
    }
}

impl From<&DownloadError> for Notice {
    fn from(e: &DownloadError) -> Self {
        Self::error(e.to_string())
    }
}
