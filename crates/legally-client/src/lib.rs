//! # legally-client
//!
//! The stateful half of the Legally client:
//!
//! - [`ContractLibrary`]: validated uploads with progress, the paged contract
//!   list, and the consistency fetch that follows every upload
//! - [`AnalysisSession`]: the live analysis state machine
//!   (`idle → connecting → streaming → finalizing → closed`, plus `errored`)
//! - [`NotificationCenter`]: transient user-facing messages
//!
//! Each store is an explicit object constructed by the host and handed to
//! whatever needs it. All of them read the bearer credential through a
//! [`SharedToken`](legally_auth::SharedToken) written by the session store.

pub mod analysis;
pub mod contracts;
pub mod error;
pub mod notifications;

pub use analysis::{AnalysisSession, CloseReason, Phase, SessionState};
pub use contracts::ContractLibrary;
pub use error::ClientError;
pub use notifications::{Notification, NotificationCenter, NotificationKind};
