//! Analysis session state machine against a scripted in-process API.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use legally_api::{AnalysisApi, ApiError, FrameStream, SseFrame};
use legally_auth::SharedToken;
use legally_client::{AnalysisSession, ClientError, CloseReason, Phase, SessionState};
use legally_core::entities::{Analysis, AnalysisRequest, Feedback};
use legally_core::enums::AnalysisStatus;
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Fake server ────────────────────────────────────────────────────

enum Script {
    Frame(SseFrame),
    Fail(&'static str),
}

/// Counts open connections; decremented when the stream is dropped.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeAnalyses {
    /// Responses to `get_analysis`, in order. `Err(status)` fails the call.
    snapshots: Mutex<VecDeque<Result<Analysis, u16>>>,
    /// One script per `open_stream` call.
    scripts: Mutex<VecDeque<Vec<Script>>>,
    /// Keep connections open after the script runs out.
    hold_open: bool,
    start_response: Mutex<Option<Result<Analysis, (u16, &'static str)>>>,
    fail_feedback: bool,
    /// Refuse every `open_stream` call with a bare 503.
    fail_open: bool,
    /// Latency of each `get_analysis` call.
    get_delay: Option<Duration>,

    get_calls: AtomicUsize,
    open_calls: AtomicUsize,
    feedback_calls: AtomicUsize,
    live: Arc<AtomicUsize>,
    /// Open connections observed while each `get_analysis` ran.
    live_during_get: Mutex<Vec<usize>>,
}

impl FakeAnalyses {
    fn with_snapshots(snapshots: Vec<Result<Analysis, u16>>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots.into()),
            ..Default::default()
        }
    }

    fn script(self, frames: Vec<Script>) -> Self {
        self.scripts.lock().unwrap().push_back(frames);
        self
    }

    fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn gets(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

impl AnalysisApi for FakeAnalyses {
    async fn start_analysis(
        &self,
        _token: &str,
        request: &AnalysisRequest,
    ) -> Result<Analysis, ApiError> {
        assert_eq!(request.output_language, "english");
        match self.start_response.lock().unwrap().take() {
            Some(Ok(analysis)) => Ok(analysis),
            Some(Err((status, detail))) => Err(ApiError::Api {
                status,
                detail: Some(detail.into()),
            }),
            None => Ok(analysis("a-1", AnalysisStatus::Queued)),
        }
    }

    async fn get_analysis(&self, _token: &str, _id: &str) -> Result<Analysis, ApiError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.live_during_get.lock().unwrap().push(self.live());
        if let Some(delay) = self.get_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.snapshots.lock().unwrap().pop_front();
        match next {
            Some(Ok(analysis)) => Ok(analysis),
            Some(Err(status)) => Err(ApiError::Api {
                status,
                detail: None,
            }),
            None => Err(ApiError::Api {
                status: 404,
                detail: Some("Analysis not found".into()),
            }),
        }
    }

    async fn open_stream(&self, token: &str, _id: &str) -> Result<FrameStream, ApiError> {
        assert_eq!(token, "t1");
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(ApiError::Api {
                status: 503,
                detail: None,
            });
        }
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        let items: Vec<Result<SseFrame, ApiError>> = script
            .into_iter()
            .map(|item| match item {
                Script::Frame(frame) => Ok(frame),
                Script::Fail(message) => Err(ApiError::Stream(message.into())),
            })
            .collect();

        let frames: FrameStream = if self.hold_open {
            Box::pin(futures::stream::iter(items).chain(futures::stream::pending()))
        } else {
            Box::pin(futures::stream::iter(items))
        };
        let guard = LiveGuard::open(&self.live);
        Ok(Box::pin(frames.map(move |item| {
            let _live = &guard;
            item
        })))
    }

    async fn submit_feedback(
        &self,
        _token: &str,
        _id: &str,
        feedback: &Feedback,
    ) -> Result<(), ApiError> {
        self.feedback_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(feedback.section, "risks");
        if self.fail_feedback {
            Err(ApiError::Api {
                status: 500,
                detail: None,
            })
        } else {
            Ok(())
        }
    }
}

// ── Fixtures ───────────────────────────────────────────────────────

fn analysis(id: &str, status: AnalysisStatus) -> Analysis {
    Analysis {
        id: id.into(),
        contract_id: "c-1".into(),
        status,
        confidence_score: None,
        formatted_output: None,
        error_message: None,
        model_used: None,
        created_at: None,
        started_at: None,
        completed_at: None,
    }
}

fn event(kind: &str, payload: serde_json::Value) -> Script {
    Script::Frame(SseFrame::message(
        json!({
            "kind": kind,
            "payload": payload,
            "timestamp": "2026-03-01T10:00:00.123456",
        })
        .to_string(),
    ))
}

fn status(status: &str) -> Script {
    event("status_change", json!({ "status": status }))
}

fn close() -> Script {
    Script::Frame(SseFrame::named("close", "{}"))
}

fn session(api: &Arc<FakeAnalyses>) -> AnalysisSession<Arc<FakeAnalyses>> {
    AnalysisSession::new(Arc::clone(api), SharedToken::fixed("t1"))
}

// ── Stream lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn terminal_status_triggers_exactly_one_refetch() {
    let mut authoritative = analysis("a-1", AnalysisStatus::Failed);
    authoritative.error_message = Some("model timeout".into());
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![
            Ok(analysis("a-1", AnalysisStatus::Queued)),
            Ok(authoritative.clone()),
        ])
        .script(vec![status("running"), status("succeeded"), close()]),
    );
    let mut session = session(&api);

    session.load("a-1").await.expect("load");
    assert_eq!(session.state(), &SessionState::Connecting);
    session.connect_stream("a-1").await.expect("connect");
    assert_eq!(session.state(), &SessionState::Streaming);

    assert!(session.step().await);
    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Running);
    assert!(session.is_analyzing());

    assert!(!session.step().await);
    assert_eq!(
        session.state(),
        &SessionState::Closed(CloseReason::Finalized { refreshed: true })
    );
    // load + one re-fetch
    assert_eq!(api.gets(), 2);
    // The connection was released before the re-fetch went out.
    assert_eq!(*api.live_during_get.lock().unwrap(), vec![0, 0]);
    assert_eq!(api.live(), 0);
    // The re-fetch is authoritative, not the streamed status.
    assert_eq!(session.analysis(), Some(&authoritative));
    assert_eq!(session.events().len(), 2);
}

#[tokio::test]
async fn error_event_forces_failed_without_refetch() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
            .script(vec![event("error", json!({ "message": "LLM provider unavailable" }))])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");

    session.run().await;

    assert_eq!(api.gets(), 1);
    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Failed);
    assert_eq!(session.error(), Some("LLM provider unavailable"));
    assert_eq!(
        session.state(),
        &SessionState::Closed(CloseReason::ErrorEvent {
            message: "LLM provider unavailable".into()
        })
    );
    assert_eq!(api.live(), 0);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn error_event_without_message_uses_default() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Queued))])
            .script(vec![event("error", json!({}))]),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");
    session.run().await;
    assert_eq!(session.error(), Some("An error occurred during analysis"));
}

#[tokio::test]
async fn terminal_status_is_never_overwritten() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Succeeded))])
            .script(vec![
                status("running"),
                event("error", json!({ "message": "late failure" })),
            ]),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");

    session.run().await;

    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Succeeded);
    assert_eq!(session.events().len(), 2);
    assert_eq!(api.gets(), 1);
}

#[tokio::test]
async fn malformed_payload_is_dropped_and_stream_continues() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Queued))])
            .script(vec![
                Script::Frame(SseFrame::message("{not json")),
                event("progress", json!({ "percent": 40 })),
                status("running"),
            ])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");

    for _ in 0..3 {
        assert!(session.step().await);
    }
    assert_eq!(session.state(), &SessionState::Streaming);
    let kinds: Vec<_> = session.events().iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["progress", "status_change"]);
    assert_eq!(session.latest_event().unwrap().kind, "status_change");
    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Running);
}

#[tokio::test]
async fn transport_end_closes_without_status_change() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Queued))])
            .script(vec![status("running")]),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");

    let state = session.run().await.clone();

    assert_eq!(state, SessionState::Closed(CloseReason::TransportClosed));
    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Running);
    assert_eq!(api.gets(), 1);
    assert_eq!(api.live(), 0);
}

#[tokio::test]
async fn transport_error_closes_the_stream() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
            .script(vec![Script::Fail("connection reset")])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");

    session.run().await;

    assert!(matches!(
        session.state(),
        SessionState::Closed(CloseReason::TransportError { .. })
    ));
    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Running);
    assert_eq!(api.live(), 0);
}

#[tokio::test]
async fn server_close_signal_closes_the_stream() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
            .script(vec![close()])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");
    session.run().await;
    assert_eq!(
        session.state(),
        &SessionState::Closed(CloseReason::ServerClosed)
    );
    assert_eq!(api.live(), 0);
}

#[tokio::test]
async fn failed_refetch_still_closes() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running)), Err(503)])
            .script(vec![status("succeeded")])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");
    session.run().await;

    assert_eq!(
        session.state(),
        &SessionState::Closed(CloseReason::Finalized { refreshed: false })
    );
    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Succeeded);
    assert_eq!(session.error(), Some("Failed to fetch analysis"));
    assert_eq!(api.live(), 0);
}

#[tokio::test]
async fn dropped_step_during_refetch_never_refetches_again() {
    let api = FakeAnalyses {
        get_delay: Some(Duration::from_millis(200)),
        ..FakeAnalyses::with_snapshots(vec![
            Ok(analysis("a-1", AnalysisStatus::Running)),
            Ok(analysis("a-1", AnalysisStatus::Succeeded)),
        ])
    };
    let api = Arc::new(
        api.script(vec![status("succeeded"), status("failed")])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");

    let cut_short = tokio::time::timeout(Duration::from_millis(5), session.step())
        .await
        .is_err();

    assert!(cut_short);
    assert_eq!(session.state(), &SessionState::Finalizing);
    assert!(!session.is_connected());
    assert_eq!(api.live(), 0);

    assert!(!session.step().await);
    assert_eq!(
        session.state(),
        &SessionState::Closed(CloseReason::Finalized { refreshed: false })
    );
    assert!(!session.step().await);
    // load + the interrupted re-fetch; the later terminal event is never read.
    assert_eq!(api.gets(), 2);
    assert_eq!(session.events().len(), 1);
    assert_eq!(session.analysis().unwrap().status, AnalysisStatus::Succeeded);
    assert_eq!(session.error(), Some("Failed to fetch analysis"));
}

#[tokio::test]
async fn interrupted_refetch_can_be_cleared() {
    let api = FakeAnalyses {
        get_delay: Some(Duration::from_millis(200)),
        ..FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
    };
    let api = Arc::new(api.script(vec![status("failed")]).held_open());
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");
    let _ = tokio::time::timeout(Duration::from_millis(5), session.step()).await;

    session.clear_analysis();

    assert_eq!(session.state(), &SessionState::Idle);
    assert!(session.analysis().is_none());
    assert_eq!(api.live(), 0);
}

// ── Connection invariants ──────────────────────────────────────────

#[tokio::test]
async fn second_connect_closes_the_first() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Queued))])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");

    session.connect_stream("a-1").await.expect("connect");
    assert_eq!(api.live(), 1);
    session.connect_stream("a-1").await.expect("reconnect");

    assert_eq!(api.open_calls.load(Ordering::SeqCst), 2);
    assert_eq!(api.live(), 1);
    assert!(session.is_connected());
    assert_eq!(session.state(), &SessionState::Streaming);
}

#[tokio::test]
async fn disconnect_is_idempotent_from_any_state() {
    // From idle.
    let api = Arc::new(FakeAnalyses::default().held_open());
    let mut idle = session(&api);
    idle.disconnect();
    idle.disconnect();
    assert_eq!(idle.state(), &SessionState::Closed(CloseReason::Disconnected));

    // From streaming, repeatedly.
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
            .held_open(),
    );
    let mut streaming = session(&api);
    streaming.load("a-1").await.expect("load");
    streaming.connect_stream("a-1").await.expect("connect");
    for _ in 0..3 {
        streaming.disconnect();
        assert_eq!(
            streaming.state(),
            &SessionState::Closed(CloseReason::Disconnected)
        );
        assert_eq!(api.live(), 0);
        assert!(!streaming.is_connected());
    }
    // No further events are accepted.
    assert!(!streaming.step().await);
}

#[tokio::test]
async fn disconnect_after_close_keeps_reason() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
            .script(vec![close()]),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");
    session.run().await;
    session.disconnect();
    assert_eq!(
        session.state(),
        &SessionState::Closed(CloseReason::ServerClosed)
    );
}

#[tokio::test]
async fn connect_without_credential_fails_before_network() {
    let api = Arc::new(FakeAnalyses::default());
    let mut session = AnalysisSession::new(Arc::clone(&api), SharedToken::new());

    let err = session.connect_stream("a-1").await.unwrap_err();

    assert!(matches!(err, ClientError::Auth(_)));
    assert_eq!(session.state().phase(), Phase::Errored);
    assert_eq!(api.open_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_stream_open_enters_error_state() {
    let api = Arc::new(FakeAnalyses {
        fail_open: true,
        ..FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
    });
    let mut session = session(&api);
    session.load("a-1").await.expect("load");

    let err = session.connect_stream("a-1").await.unwrap_err();

    assert!(
        matches!(&err, ClientError::Stream(message) if message == "Failed to connect to analysis stream")
    );
    assert_eq!(
        session.state(),
        &SessionState::Errored {
            message: "Failed to connect to analysis stream".into()
        }
    );
    assert!(!session.is_connected());
    assert_eq!(api.live(), 0);
    assert_eq!(api.open_calls.load(Ordering::SeqCst), 1);
    assert!(!session.step().await);
}

// ── Loading and side actions ───────────────────────────────────────

#[tokio::test]
async fn load_failure_enters_error_state() {
    let api = Arc::new(FakeAnalyses::default());
    let mut session = session(&api);

    let err = session.load("missing").await.unwrap_err();

    assert_eq!(err.to_string(), "Analysis not found");
    assert_eq!(
        session.state(),
        &SessionState::Errored {
            message: "Analysis not found".into()
        }
    );
    assert!(!session.loading());
}

#[tokio::test]
async fn start_reports_quota_detail() {
    let api = Arc::new(FakeAnalyses::default());
    *api.start_response.lock().unwrap() = Some(Err((
        402,
        "Free tier limit reached. Upgrade to premium for unlimited analyses.",
    )));
    let mut session = session(&api);

    let err = session.start("c-1", "english").await.unwrap_err();

    assert_eq!(err.status(), Some(402));
    assert!(session.error().unwrap().starts_with("Free tier limit reached"));
    assert!(session.analysis().is_none());
}

#[tokio::test]
async fn start_adopts_the_new_analysis() {
    let api = Arc::new(FakeAnalyses::default());
    let mut session = session(&api);
    let analysis = session.start("c-1", "english").await.expect("start");
    assert_eq!(analysis.status, AnalysisStatus::Queued);
    assert_eq!(session.state(), &SessionState::Connecting);
    assert!(session.is_analyzing());
    assert!(!session.has_results());
}

#[tokio::test]
async fn feedback_failure_leaves_projection_untouched() {
    let api = Arc::new(FakeAnalyses {
        fail_feedback: true,
        ..FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Succeeded))])
    });
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    let before = session.analysis().cloned();

    let err = session
        .submit_feedback("a-1", "risks", false, Some("missed clause 4"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to submit feedback");
    assert_eq!(session.analysis().cloned(), before);
    assert_eq!(session.state(), &SessionState::Connecting);
    assert_eq!(api.feedback_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clear_analysis_returns_to_idle() {
    let api = Arc::new(
        FakeAnalyses::with_snapshots(vec![Ok(analysis("a-1", AnalysisStatus::Running))])
            .script(vec![status("running")])
            .held_open(),
    );
    let mut session = session(&api);
    session.load("a-1").await.expect("load");
    session.connect_stream("a-1").await.expect("connect");
    session.step().await;

    session.clear_analysis();

    assert_eq!(session.state(), &SessionState::Idle);
    assert!(session.analysis().is_none());
    assert!(session.events().is_empty());
    assert_eq!(api.live(), 0);
}
