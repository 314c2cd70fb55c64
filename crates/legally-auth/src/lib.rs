//! # legally-auth
//!
//! Session state for the Legally client.
//!
//! [`SessionStore`] owns the bearer credential and the signed-in profile. It
//! is the only writer of the credential; other components read it through a
//! cloned [`SharedToken`]. The credential survives restarts through a
//! [`CredentialStore`]: the OS keychain via `keyring`, with a `0600` file
//! fallback, or memory only.

pub mod error;
pub mod session;
pub mod shared;
pub mod token_store;

pub use error::AuthError;
pub use session::SessionStore;
pub use shared::SharedToken;
pub use token_store::{CredentialStore, KeyringStore, MemoryStore};
