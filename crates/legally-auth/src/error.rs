use legally_api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated; run `legally auth login`")]
    NotAuthenticated,

    /// The server refused or failed the request. `reason` is the server's
    /// `detail` or the call site's fallback message.
    #[error("{reason}")]
    RequestFailed { reason: String, status: Option<u16> },

    #[error("keyring error: {0}")]
    KeyringError(String),

    #[error("token store error: {0}")]
    TokenStoreError(String),
}

impl AuthError {
    /// Normalize a transport error into a user-facing failure.
    #[must_use]
    pub fn from_api(error: &ApiError, fallback: &str) -> Self {
        Self::RequestFailed {
            reason: error.reason_or(fallback),
            status: error.status(),
        }
    }
}
