//! Transport error types.

use thiserror::Error;

/// Errors that can occur when talking to the Legally API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport error (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `detail` field of the JSON error body, when present.
        detail: Option<String>,
    },

    /// A success response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The event stream failed mid-flight.
    #[error("stream error: {0}")]
    Stream(String),

    /// A local file could not be read for upload.
    #[error("file error: {0}")]
    File(String),
}

impl ApiError {
    /// Server-provided detail message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// User-facing message: the server's detail, or `fallback` when there is none.
    #[must_use]
    pub fn reason_or(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    /// 401 or 403: the credential was missing, expired or rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}
