//! # legally-core
//!
//! Core types shared by every Legally client crate:
//! - Entity structs mirroring the REST payloads (users, contracts, analyses, events)
//! - Status enums with forward-only transition tables
//! - Client-side upload preconditions
//! - [`BusyFlag`], the loading indicator that is lowered on every exit path
//! - Cross-cutting error types
//! - Serde adapters for the server's timestamp formats

pub mod busy;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod timestamp;
pub mod upload;

pub use busy::{BusyFlag, BusyGuard};
pub use errors::CoreError;
