//! `/analyses/*` endpoints, including the live event stream.

use legally_core::entities::{Analysis, AnalysisRequest, Feedback};

use crate::http::{check_response, decode_json};
use crate::sse::{FrameStream, decode_stream};
use crate::{AnalysisApi, ApiClient, ApiError};

impl AnalysisApi for ApiClient {
    async fn start_analysis(
        &self,
        token: &str,
        request: &AnalysisRequest,
    ) -> Result<Analysis, ApiError> {
        let resp = self
            .http
            .post(self.url("/analyses"))
            .timeout(self.timeout)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn get_analysis(&self, token: &str, analysis_id: &str) -> Result<Analysis, ApiError> {
        let path = format!("/analyses/{}", urlencoding::encode(analysis_id));
        let resp = self
            .http
            .get(self.url(&path))
            .timeout(self.timeout)
            .bearer_auth(token)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn open_stream(&self, token: &str, analysis_id: &str) -> Result<FrameStream, ApiError> {
        // No per-request timeout: the stream stays open until the server closes it.
        let resp = self
            .http
            .get(self.stream_url(analysis_id, token))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let resp = check_response(resp).await?;
        tracing::debug!(analysis_id, "event stream opened");
        Ok(decode_stream(resp.bytes_stream()))
    }

    async fn submit_feedback(
        &self,
        token: &str,
        analysis_id: &str,
        feedback: &Feedback,
    ) -> Result<(), ApiError> {
        let path = format!("/analyses/{}/feedback", urlencoding::encode(analysis_id));
        let resp = self
            .http
            .post(self.url(&path))
            .timeout(self.timeout)
            .bearer_auth(token)
            .json(feedback)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }
}
