//! # legally-api
//!
//! HTTP transport for the Legally contract-analysis API.
//!
//! - REST endpoints under a configurable base URL, JSON bodies, bearer auth
//! - Multipart contract upload with byte-level progress reporting
//! - The live analysis event stream (`text/event-stream`), decoded into
//!   [`SseFrame`]s
//!
//! Each concern is exposed as a trait ([`AuthApi`], [`ContractApi`],
//! [`AnalysisApi`]) implemented by [`ApiClient`], so the stateful layers can
//! be driven by in-process fakes in tests.

mod analyses;
mod auth;
mod contracts;
mod error;
mod http;
pub mod sse;
mod upload;

pub use error::ApiError;
pub use sse::{FrameStream, SseDecoder, SseFrame};
pub use upload::{ProgressFn, UploadFile};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use legally_config::ApiConfig;
use legally_core::entities::{
    Analysis, AnalysisRequest, AuthResponse, Contract, ContractPage, Credentials, Feedback,
    UploadReceipt, UserProfile,
};

// ── Seams ──────────────────────────────────────────────────────────

/// `/auth/*` endpoints.
pub trait AuthApi: Send + Sync {
    fn register(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn logout(&self, token: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn current_user(&self, token: &str)
    -> impl Future<Output = Result<UserProfile, ApiError>> + Send;
}

/// `/contracts/*` endpoints.
pub trait ContractApi: Send + Sync {
    fn upload_contract(
        &self,
        token: &str,
        file: &UploadFile,
        progress: ProgressFn,
    ) -> impl Future<Output = Result<UploadReceipt, ApiError>> + Send;

    fn list_contracts(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<ContractPage, ApiError>> + Send;

    fn get_contract(
        &self,
        token: &str,
        contract_id: &str,
    ) -> impl Future<Output = Result<Contract, ApiError>> + Send;

    fn delete_contract(
        &self,
        token: &str,
        contract_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// `/analyses/*` endpoints, including the live stream.
pub trait AnalysisApi: Send + Sync {
    fn start_analysis(
        &self,
        token: &str,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<Analysis, ApiError>> + Send;

    fn get_analysis(
        &self,
        token: &str,
        analysis_id: &str,
    ) -> impl Future<Output = Result<Analysis, ApiError>> + Send;

    /// Open the event stream. The returned stream owns the connection;
    /// dropping it closes the connection.
    fn open_stream(
        &self,
        token: &str,
        analysis_id: &str,
    ) -> impl Future<Output = Result<FrameStream, ApiError>> + Send;

    fn submit_feedback(
        &self,
        token: &str,
        analysis_id: &str,
        feedback: &Feedback,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

// Shared handles forward to the inner implementation.

impl<T: AuthApi> AuthApi for Arc<T> {
    fn register(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        (**self).register(credentials)
    }

    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        (**self).login(credentials)
    }

    fn logout(&self, token: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).logout(token)
    }

    fn current_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<UserProfile, ApiError>> + Send {
        (**self).current_user(token)
    }
}

impl<T: ContractApi> ContractApi for Arc<T> {
    fn upload_contract(
        &self,
        token: &str,
        file: &UploadFile,
        progress: ProgressFn,
    ) -> impl Future<Output = Result<UploadReceipt, ApiError>> + Send {
        (**self).upload_contract(token, file, progress)
    }

    fn list_contracts(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<ContractPage, ApiError>> + Send {
        (**self).list_contracts(token, page, page_size)
    }

    fn get_contract(
        &self,
        token: &str,
        contract_id: &str,
    ) -> impl Future<Output = Result<Contract, ApiError>> + Send {
        (**self).get_contract(token, contract_id)
    }

    fn delete_contract(
        &self,
        token: &str,
        contract_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).delete_contract(token, contract_id)
    }
}

impl<T: AnalysisApi> AnalysisApi for Arc<T> {
    fn start_analysis(
        &self,
        token: &str,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<Analysis, ApiError>> + Send {
        (**self).start_analysis(token, request)
    }

    fn get_analysis(
        &self,
        token: &str,
        analysis_id: &str,
    ) -> impl Future<Output = Result<Analysis, ApiError>> + Send {
        (**self).get_analysis(token, analysis_id)
    }

    fn open_stream(
        &self,
        token: &str,
        analysis_id: &str,
    ) -> impl Future<Output = Result<FrameStream, ApiError>> + Send {
        (**self).open_stream(token, analysis_id)
    }

    fn submit_feedback(
        &self,
        token: &str,
        analysis_id: &str,
        feedback: &Feedback,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).submit_feedback(token, analysis_id, feedback)
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the Legally API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// Only the connect timeout is set on the underlying client; the request
    /// timeout is applied per REST call so the long-lived stream is never cut.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self::with_client(
            http,
            config.normalized_base_url(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    /// Wrap an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// URL of the live event stream.
    ///
    /// The stream transport cannot carry an `Authorization` header, so the
    /// bearer token travels as the `token` query parameter. This is the only
    /// endpoint that authenticates this way.
    #[must_use]
    pub fn stream_url(&self, analysis_id: &str, token: &str) -> String {
        format!(
            "{}/analyses/{}/stream?token={}",
            self.base_url,
            urlencoding::encode(analysis_id),
            urlencoding::encode(token)
        )
    }
}
