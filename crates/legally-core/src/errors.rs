//! Cross-cutting error types for the Legally client.
//!
//! Transport, auth and client-level errors live in their own crates
//! (`ApiError`, `AuthError`, `ClientError`). This module only carries the
//! failures that can be detected without any I/O.

use thiserror::Error;

/// Errors that can be raised by any Legally crate before touching the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        from: String,
        to: String,
    },

    /// Data failed a client-side precondition.
    #[error("{0}")]
    Validation(String),
}
