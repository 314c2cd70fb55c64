use futures::StreamExt;
use legally_api::{AnalysisApi, ApiError, FrameStream, SseFrame};
use legally_auth::{AuthError, SharedToken};
use legally_core::BusyFlag;
use legally_core::entities::{Analysis, AnalysisEvent, AnalysisRequest, Feedback};
use legally_core::enums::{AnalysisStatus, EventKind};

use super::state::{CloseReason, SessionState};
use crate::error::ClientError;

const FETCH_ANALYSIS_FAILED: &str = "Failed to fetch analysis";
const START_FAILED: &str = "Failed to start analysis";
const FEEDBACK_FAILED: &str = "Failed to submit feedback";
const CONNECT_FAILED: &str = "Failed to connect to analysis stream";
const DEFAULT_ERROR_MESSAGE: &str = "An error occurred during analysis";

/// The one open stream of a session.
struct Connection {
    analysis_id: String,
    frames: FrameStream,
}

/// Live view of one analysis.
///
/// The session owns the analysis projection, the append-only event log and
/// at most one stream connection. Every method takes `&mut self`, so events,
/// re-fetches and disconnects are applied strictly one after another.
pub struct AnalysisSession<A> {
    api: A,
    token: SharedToken,
    state: SessionState,
    analysis: Option<Analysis>,
    events: Vec<AnalysisEvent>,
    connection: Option<Connection>,
    loading: BusyFlag,
    error: Option<String>,
}

impl<A: AnalysisApi> AnalysisSession<A> {
    pub fn new(api: A, token: SharedToken) -> Self {
        Self {
            api,
            token,
            state: SessionState::Idle,
            analysis: None,
            events: Vec::new(),
            connection: None,
            loading: BusyFlag::new(),
            error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Every event received since the analysis was loaded, in arrival order.
    #[must_use]
    pub fn events(&self) -> &[AnalysisEvent] {
        &self.events
    }

    #[must_use]
    pub fn latest_event(&self) -> Option<&AnalysisEvent> {
        self.events.last()
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading.is_set()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The analysis is queued or running.
    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        self.analysis.as_ref().is_some_and(|a| {
            matches!(a.status, AnalysisStatus::Queued | AnalysisStatus::Running)
        })
    }

    /// The analysis succeeded and carries its formatted output.
    #[must_use]
    pub fn has_results(&self) -> bool {
        self.analysis
            .as_ref()
            .is_some_and(|a| a.status == AnalysisStatus::Succeeded && a.formatted_output.is_some())
    }

    // ── Loading ────────────────────────────────────────────────────

    /// Request a new analysis of `contract_id` and adopt it.
    ///
    /// The server may hand back an existing analysis for the same contract.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] when signed out, otherwise the normalized failure
    /// (HTTP 402 carries the free-tier limit message).
    pub async fn start(
        &mut self,
        contract_id: &str,
        output_language: &str,
    ) -> Result<Analysis, ClientError> {
        self.settle_interrupted_refetch();
        let token = self.require_token()?;
        let _busy = self.loading.raise();
        self.error = None;
        let request = AnalysisRequest {
            contract_id: contract_id.to_string(),
            output_language: output_language.to_string(),
        };
        tracing::info!(contract_id, output_language, "starting analysis");
        let result = self.api.start_analysis(&token, &request).await;
        let analysis = result.map_err(|error| self.errored(&error, START_FAILED))?;
        self.adopt(analysis.clone());
        Ok(analysis)
    }

    /// Fetch the authoritative snapshot of `analysis_id` and adopt it.
    ///
    /// Any open connection is released and the event log starts over.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] when signed out, otherwise the normalized failure.
    /// The session moves to [`SessionState::Errored`].
    pub async fn load(&mut self, analysis_id: &str) -> Result<Analysis, ClientError> {
        self.settle_interrupted_refetch();
        let token = self.require_token()?;
        let _busy = self.loading.raise();
        self.error = None;
        let result = self.api.get_analysis(&token, analysis_id).await;
        let analysis = result.map_err(|error| self.errored(&error, FETCH_ANALYSIS_FAILED))?;
        self.adopt(analysis.clone());
        Ok(analysis)
    }

    fn adopt(&mut self, analysis: Analysis) {
        self.release();
        self.events.clear();
        self.analysis = Some(analysis);
        self.transition(SessionState::Connecting);
    }

    // ── Streaming ──────────────────────────────────────────────────

    /// Open the live stream for `analysis_id`.
    ///
    /// A connection that is already open is released first, so at most one is
    /// ever open. The credential travels as a query parameter on this call
    /// only.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] when signed out, [`ClientError::Stream`] when the
    /// connection cannot be opened. Either way the session is `Errored`.
    pub async fn connect_stream(&mut self, analysis_id: &str) -> Result<(), ClientError> {
        self.settle_interrupted_refetch();
        self.release();
        self.transition(SessionState::Connecting);
        let token = self.require_token()?;

        match self.api.open_stream(&token, analysis_id).await {
            Ok(frames) => {
                self.connection = Some(Connection {
                    analysis_id: analysis_id.to_string(),
                    frames,
                });
                self.transition(SessionState::Streaming);
                tracing::debug!(analysis_id, "stream connected");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, analysis_id, "opening analysis stream failed");
                let message = error.reason_or(CONNECT_FAILED);
                self.error = Some(message.clone());
                self.transition(SessionState::Errored {
                    message: message.clone(),
                });
                Err(ClientError::Stream(message))
            }
        }
    }

    /// Receive and apply the next stream frame.
    ///
    /// Returns `true` while the session is still streaming. Dropping the
    /// returned future is safe: a re-fetch cut short is settled by the next
    /// call and never issued again.
    pub async fn step(&mut self) -> bool {
        self.settle_interrupted_refetch();
        if self.state != SessionState::Streaming {
            return false;
        }
        let Some(connection) = self.connection.as_mut() else {
            return false;
        };
        match connection.frames.next().await {
            None => {
                tracing::debug!("stream ended");
                self.close(CloseReason::TransportClosed);
            }
            Some(Err(error)) => {
                tracing::warn!(%error, "analysis stream failed");
                self.close(CloseReason::TransportError {
                    message: error.to_string(),
                });
            }
            Some(Ok(frame)) if frame.is_named("close") => {
                tracing::debug!("server closed the stream");
                self.close(CloseReason::ServerClosed);
            }
            Some(Ok(frame)) => {
                if let Some(event) = parse_event(&frame) {
                    self.apply(event).await;
                }
            }
        }
        self.state == SessionState::Streaming
    }

    /// Drive the stream until the session leaves `Streaming`.
    pub async fn run(&mut self) -> &SessionState {
        while self.step().await {}
        &self.state
    }

    async fn apply(&mut self, event: AnalysisEvent) {
        let kind = event.event_kind();
        let status = event.payload_status();
        let message = event.payload_message().map(str::to_string);
        tracing::debug!(kind = %event.kind, "analysis event");
        self.events.push(event);

        match kind {
            EventKind::StatusChange => {
                let Some(status) = status else {
                    return;
                };
                if let Some(analysis) = self.analysis.as_mut()
                    && !analysis.advance_status(status)
                {
                    tracing::debug!(
                        from = %analysis.status,
                        to = %status,
                        "ignoring out-of-order status"
                    );
                }
                if status.is_terminal() {
                    self.finalize().await;
                }
            }
            EventKind::Error => {
                let message = message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
                if let Some(analysis) = self.analysis.as_mut()
                    && !analysis.status.is_terminal()
                {
                    analysis.status = AnalysisStatus::Failed;
                }
                self.error = Some(message.clone());
                self.close(CloseReason::ErrorEvent { message });
            }
            EventKind::Progress | EventKind::Other => {}
        }
    }

    /// One authoritative re-fetch, then close.
    ///
    /// The connection is released before the request goes out, so no frame
    /// can be read while `Finalizing`.
    async fn finalize(&mut self) {
        let analysis_id = self
            .connection
            .as_ref()
            .map(|c| c.analysis_id.clone())
            .or_else(|| self.analysis.as_ref().map(|a| a.id.clone()))
            .unwrap_or_default();
        self.release();
        self.transition(SessionState::Finalizing);

        let refreshed = match self.token.get() {
            Some(token) => match self.api.get_analysis(&token, &analysis_id).await {
                Ok(analysis) => {
                    self.analysis = Some(analysis);
                    true
                }
                Err(error) => {
                    tracing::warn!(%error, analysis_id, "final re-fetch failed");
                    self.error = Some(error.reason_or(FETCH_ANALYSIS_FAILED));
                    false
                }
            },
            None => {
                self.error = Some(AuthError::NotAuthenticated.to_string());
                false
            }
        };
        self.close(CloseReason::Finalized { refreshed });
    }

    // ── Teardown ───────────────────────────────────────────────────

    /// Release the connection and close. Safe to call any number of times
    /// from any state; an existing close reason is kept.
    pub fn disconnect(&mut self) {
        self.settle_interrupted_refetch();
        self.release();
        if !self.state.is_closed() {
            self.transition(SessionState::Closed(CloseReason::Disconnected));
        }
    }

    /// Drop the analysis and its event log and return to `Idle`.
    pub fn clear_analysis(&mut self) {
        self.settle_interrupted_refetch();
        self.release();
        self.analysis = None;
        self.events.clear();
        self.error = None;
        self.transition(SessionState::Idle);
    }

    /// Close a session whose re-fetch future was dropped mid-flight. The
    /// streamed status stands.
    fn settle_interrupted_refetch(&mut self) {
        if self.state != SessionState::Finalizing {
            return;
        }
        tracing::warn!("final re-fetch was interrupted; keeping streamed status");
        self.error = Some(FETCH_ANALYSIS_FAILED.to_string());
        self.close(CloseReason::Finalized { refreshed: false });
    }

    fn close(&mut self, reason: CloseReason) {
        self.release();
        self.transition(SessionState::Closed(reason));
    }

    fn release(&mut self) {
        if let Some(connection) = self.connection.take() {
            tracing::debug!(analysis_id = %connection.analysis_id, "stream released");
        }
    }

    // ── Feedback ───────────────────────────────────────────────────

    /// Send a correctness rating for one section of the output.
    ///
    /// Takes `&self`: the projection is never touched, whatever the outcome.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] when signed out, otherwise the normalized failure.
    pub async fn submit_feedback(
        &self,
        analysis_id: &str,
        section: &str,
        is_correct: bool,
        comment: Option<&str>,
    ) -> Result<(), ClientError> {
        let token = self
            .token
            .get()
            .ok_or(ClientError::Auth(AuthError::NotAuthenticated))?;
        let feedback = Feedback {
            section: section.to_string(),
            is_correct,
            comment: comment.map(str::to_string),
        };
        self.api
            .submit_feedback(&token, analysis_id, &feedback)
            .await
            .map_err(|error| ClientError::from_api(&error, FEEDBACK_FAILED))
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn require_token(&mut self) -> Result<String, ClientError> {
        if let Some(token) = self.token.get() {
            return Ok(token);
        }
        let message = AuthError::NotAuthenticated.to_string();
        self.error = Some(message.clone());
        self.release();
        self.transition(SessionState::Errored { message });
        Err(ClientError::Auth(AuthError::NotAuthenticated))
    }

    fn errored(&mut self, error: &ApiError, fallback: &str) -> ClientError {
        let error = ClientError::from_api(error, fallback);
        let message = error.to_string();
        self.error = Some(message.clone());
        self.release();
        self.transition(SessionState::Errored { message });
        error
    }

    fn transition(&mut self, next: SessionState) {
        let from = self.state.phase();
        let to = next.phase();
        debug_assert!(from.can_transition_to(to), "analysis session {from} -> {to}");
        if let Err(error) = from.check_transition(to) {
            tracing::error!(%error, "unexpected analysis session transition");
        }
        tracing::debug!(%from, %to, "analysis session transition");
        self.state = next;
    }
}

/// Decode one data frame. Malformed payloads are logged and dropped.
fn parse_event(frame: &SseFrame) -> Option<AnalysisEvent> {
    match serde_json::from_str(&frame.data) {
        Ok(event) => Some(event),
        Err(error) => {
            tracing::warn!(%error, data = %frame.data, "dropping malformed stream payload");
            None
        }
    }
}
