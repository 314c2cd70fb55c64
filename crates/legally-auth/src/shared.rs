//! Read handle on the session credential.

use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable view of the current bearer token.
///
/// Clones observe the same value. Only [`SessionStore`](crate::SessionStore)
/// writes through it.
#[derive(Debug, Clone, Default)]
pub struct SharedToken(Arc<RwLock<Option<String>>>);

impl SharedToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A standalone handle holding `token`, not tied to any session.
    #[must_use]
    pub fn fixed(token: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(Some(token.into()))))
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn set(&self, token: Option<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}
