use legally_api::ApiClient;
use legally_client::{AnalysisSession, CloseReason};
use legally_core::entities::{Analysis, AnalysisEvent};
use legally_core::enums::AnalysisStatus;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AnalysisIdArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// One line per streamed event.
#[derive(Serialize)]
struct EventLine<'a> {
    event: &'a AnalysisEvent,
}

/// Final line once the stream has closed.
#[derive(Serialize)]
struct WatchSummary<'a> {
    state: String,
    close_reason: Option<String>,
    events: usize,
    analysis: Option<&'a Analysis>,
}

pub async fn handle(
    args: &AnalysisIdArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.analysis();
    let snapshot = session.load(&args.id).await?;
    if snapshot.status.is_terminal() {
        tracing::debug!(analysis_id = %args.id, status = %snapshot.status, "already settled");
        return output(&snapshot, flags.format);
    }
    follow(&mut session, &args.id, ctx, flags).await
}

/// Connect, print events as they arrive, then print the settled analysis.
pub async fn follow(
    session: &mut AnalysisSession<ApiClient>,
    analysis_id: &str,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    session.connect_stream(analysis_id).await?;
    ctx.flush_notifications(flags);
    let spinner = Progress::spinner("waiting for events");

    let mut printed = 0;
    loop {
        let more = tokio::select! {
            more = session.step() => Some(more),
            _ = tokio::signal::ctrl_c() => None,
        };

        for event in &session.events()[printed..] {
            spinner.set_message(&event.kind);
            output(&EventLine { event }, flags.format)?;
        }
        printed = session.events().len();

        match more {
            Some(true) => {}
            Some(false) => break,
            None => {
                session.disconnect();
                break;
            }
        }
    }
    spinner.finish_clear();

    let reason = session.state().close_reason().cloned();
    output(
        &WatchSummary {
            state: session.state().to_string(),
            close_reason: reason.as_ref().map(describe),
            events: session.events().len(),
            analysis: session.analysis(),
        },
        flags.format,
    )?;

    match reason {
        Some(CloseReason::Finalized { refreshed }) => {
            if !refreshed {
                ctx.notifications.warning(
                    "Showing streamed status",
                    session.error().map(str::to_string),
                );
            }
            match session.analysis() {
                Some(analysis) if analysis.status == AnalysisStatus::Failed => {
                    let message = analysis
                        .error_message
                        .clone()
                        .unwrap_or_else(|| "analysis failed".to_string());
                    ctx.notifications
                        .error("Analysis failed", Some(message.clone()));
                    anyhow::bail!("analysis failed: {message}")
                }
                _ => {
                    ctx.notifications.success("Analysis finished", None);
                    Ok(())
                }
            }
        }
        Some(CloseReason::ErrorEvent { message }) => {
            ctx.notifications
                .error("Analysis failed", Some(message.clone()));
            anyhow::bail!("analysis failed: {message}")
        }
        Some(CloseReason::TransportError { message }) => {
            anyhow::bail!("analysis stream failed: {message}")
        }
        Some(CloseReason::Disconnected) => {
            ctx.notifications.info("Stopped watching", None);
            Ok(())
        }
        Some(CloseReason::ServerClosed | CloseReason::TransportClosed) => {
            ctx.notifications
                .info("Stream closed before the analysis finished", None);
            Ok(())
        }
        None => match session.error() {
            Some(error) => anyhow::bail!("{error}"),
            None => Ok(()),
        },
    }
}

fn describe(reason: &CloseReason) -> String {
    match reason {
        CloseReason::Finalized { refreshed: true } => "finalized".into(),
        CloseReason::Finalized { refreshed: false } => "finalized (refresh failed)".into(),
        CloseReason::ErrorEvent { message } => format!("error event: {message}"),
        CloseReason::ServerClosed => "server closed".into(),
        CloseReason::TransportClosed => "stream ended".into(),
        CloseReason::TransportError { message } => format!("transport error: {message}"),
        CloseReason::Disconnected => "disconnected".into(),
    }
}
