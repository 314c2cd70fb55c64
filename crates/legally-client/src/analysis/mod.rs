//! The live analysis session.
//!
//! ```text
//! idle ──load/start──▶ connecting ──connect_stream──▶ streaming
//!                                                      │  status_change (terminal)
//!                                                      ▼
//!                                  closed ◀──re-fetch── finalizing
//!
//! streaming ──error event / close signal / transport end──▶ closed
//! any ──disconnect──▶ closed        load, start, connect failures ──▶ error
//! ```

mod session;
mod state;

pub use session::AnalysisSession;
pub use state::{CloseReason, Phase, SessionState};
