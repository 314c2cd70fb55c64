use std::fmt;

use legally_core::CoreError;

/// Why a session reached [`SessionState::Closed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// A terminal `status_change` arrived and the re-fetch settled.
    /// `refreshed` is false when the re-fetch failed and the streamed status stands.
    Finalized { refreshed: bool },
    /// The server reported an `error` event.
    ErrorEvent { message: String },
    /// The server sent the named `close` signal.
    ServerClosed,
    /// The response body ended.
    TransportClosed,
    /// The connection failed mid-stream.
    TransportError { message: String },
    /// The caller disconnected.
    Disconnected,
}

/// Where an [`AnalysisSession`](super::AnalysisSession) is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No analysis loaded.
    #[default]
    Idle,
    /// A snapshot is loaded (or a stream is being opened); no live connection yet.
    Connecting,
    /// Exactly one connection is open and events are being applied.
    Streaming,
    /// A terminal status arrived; the authoritative re-fetch is in flight.
    Finalizing,
    /// No connection is open and no further events are accepted.
    Closed(CloseReason),
    /// Loading, starting or connecting failed.
    Errored { message: String },
}

impl SessionState {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Connecting => Phase::Connecting,
            Self::Streaming => Phase::Streaming,
            Self::Finalizing => Phase::Finalizing,
            Self::Closed(_) => Phase::Closed,
            Self::Errored { .. } => Phase::Errored,
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    #[must_use]
    pub const fn close_reason(&self) -> Option<&CloseReason> {
        match self {
            Self::Closed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phase().as_str())
    }
}

/// Payload-free view of [`SessionState`] carrying the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Connecting,
    Streaming,
    Finalizing,
    Closed,
    Errored,
}

impl Phase {
    /// Every phase can reach `Closed`. Only `Finalizing` cannot be cleared
    /// back to `Idle`: the re-fetch always settles into `Closed` first.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle => &[Self::Idle, Self::Connecting, Self::Closed, Self::Errored],
            Self::Connecting => &[
                Self::Connecting,
                Self::Streaming,
                Self::Closed,
                Self::Errored,
                Self::Idle,
            ],
            Self::Streaming => &[
                Self::Connecting,
                Self::Finalizing,
                Self::Closed,
                Self::Errored,
                Self::Idle,
            ],
            Self::Finalizing => &[Self::Closed],
            Self::Closed | Self::Errored => {
                &[Self::Connecting, Self::Closed, Self::Errored, Self::Idle]
            }
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] when `next` is not reachable.
    pub fn check_transition(self, next: Self) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity_type: "analysis session".into(),
                from: self.as_str().into(),
                to: next.as_str().into(),
            })
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalizing",
            Self::Closed => "closed",
            Self::Errored => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
