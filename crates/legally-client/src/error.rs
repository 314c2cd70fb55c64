use legally_api::ApiError;
use legally_auth::AuthError;
use legally_core::CoreError;
use thiserror::Error;

/// Failures surfaced by the client stores.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A client-side precondition failed. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// No credential, or the server rejected it.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport or server failure, normalized to a user-facing message.
    #[error("{message}")]
    Network { message: String, status: Option<u16> },

    /// A response could not be decoded.
    #[error("{0}")]
    Parse(String),

    /// The live stream failed.
    #[error("{0}")]
    Stream(String),
}

impl ClientError {
    /// Normalize a transport error, using `fallback` when the server gave no detail.
    #[must_use]
    pub fn from_api(error: &ApiError, fallback: &str) -> Self {
        match error {
            ApiError::Parse(_) => Self::Parse(fallback.to_string()),
            ApiError::Stream(_) => Self::Stream(fallback.to_string()),
            ApiError::File(detail) => Self::Validation(detail.clone()),
            ApiError::Http(_) | ApiError::Api { .. } => Self::Network {
                message: error.reason_or(fallback),
                status: error.status(),
            },
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            Self::Auth(AuthError::RequestFailed { status, .. }) => *status,
            _ => None,
        }
    }
}

impl From<CoreError> for ClientError {
    fn from(error: CoreError) -> Self {
        Self::Validation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_keeps_detail_and_status() {
        let err = ClientError::from_api(
            &ApiError::Api {
                status: 402,
                detail: Some("Free tier limit reached".into()),
            },
            "Failed to start analysis",
        );
        assert_eq!(err.to_string(), "Free tier limit reached");
        assert_eq!(err.status(), Some(402));
    }

    #[test]
    fn parse_error_uses_fallback() {
        let err = ClientError::from_api(&ApiError::Parse("eof".into()), "Failed to fetch contract");
        assert!(matches!(err, ClientError::Parse(ref m) if m == "Failed to fetch contract"));
    }

    #[test]
    fn core_validation_maps_to_validation() {
        let err: ClientError = CoreError::Validation("File size exceeds 10MB limit.".into()).into();
        assert!(matches!(err, ClientError::Validation(ref m) if m == "File size exceeds 10MB limit."));
    }
}
