//! `/auth/*` endpoints.

use legally_core::entities::{AuthResponse, Credentials, UserProfile};

use crate::http::{check_response, decode_json};
use crate::{ApiClient, ApiError, AuthApi};

impl AuthApi for ApiClient {
    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        tracing::debug!(email = %credentials.email, "registering account");
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .timeout(self.timeout)
            .json(credentials)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        tracing::debug!(email = %credentials.email, "logging in");
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .timeout(self.timeout)
            .json(credentials)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/logout"))
            .timeout(self.timeout)
            .bearer_auth(token)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, ApiError> {
        let resp = self
            .http
            .get(self.url("/auth/me"))
            .timeout(self.timeout)
            .bearer_auth(token)
            .send()
            .await?;
        decode_json(resp).await
    }
}
