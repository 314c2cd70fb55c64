//! Loading indicator that cannot get stuck.
//!
//! Every store exposes a `loading`/`uploading` flag. The flag is raised for
//! the duration of a network call and lowered when the returned [`BusyGuard`]
//! drops, which covers success, error returns, and a cancelled future alike.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared boolean flag. Clones observe the same value.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag until the returned guard is dropped.
    #[must_use = "the flag is lowered as soon as the guard is dropped"]
    pub fn raise(&self) -> BusyGuard {
        self.0.store(true, Ordering::Release);
        BusyGuard(Arc::clone(&self.0))
    }
}

/// Lowers its [`BusyFlag`] on drop.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
