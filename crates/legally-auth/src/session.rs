//! The signed-in session.
//!
//! Invariant: the session is authenticated exactly when both a credential and
//! a profile are present. Login and registration set both at once; logout and
//! a rejected credential clear both.

use legally_api::{ApiError, AuthApi};
use legally_core::BusyFlag;
use legally_core::entities::{AuthResponse, Credentials, UserProfile};
use legally_core::enums::Tier;

use crate::error::AuthError;
use crate::shared::SharedToken;
use crate::token_store::CredentialStore;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const FETCH_USER_FAILED: &str = "Failed to fetch user";

/// Credential and profile of the current user.
pub struct SessionStore<A, S> {
    api: A,
    storage: S,
    token: SharedToken,
    user: Option<UserProfile>,
    loading: BusyFlag,
    error: Option<String>,
}

impl<A: AuthApi, S: CredentialStore> SessionStore<A, S> {
    /// An empty, unauthenticated session.
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            token: SharedToken::new(),
            user: None,
            loading: BusyFlag::new(),
            error: None,
        }
    }

    /// Read handle on the credential for other components.
    #[must_use]
    pub fn token_handle(&self) -> SharedToken {
        self.token.clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.get()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading.is_set()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // ── Derived facts ──────────────────────────────────────────────

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_present() && self.user.is_some()
    }

    #[must_use]
    pub fn is_free_user(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.tier == Tier::Free)
    }

    #[must_use]
    pub fn is_premium_user(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.tier == Tier::Premium)
    }

    /// Premium, or free with quota left. False when signed out.
    #[must_use]
    pub fn has_analyses_remaining(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::can_analyze)
    }

    // ── Operations ─────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns [`AuthError::RequestFailed`] with the normalized reason. The
    /// previous session is left untouched.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), AuthError> {
        let _busy = self.loading.raise();
        self.error = None;
        tracing::debug!(email = %credentials.email, "login");
        let result = self.api.login(credentials).await;
        self.accept(result, LOGIN_FAILED)
    }

    /// # Errors
    ///
    /// Same contract as [`Self::login`].
    pub async fn register(&mut self, credentials: &Credentials) -> Result<(), AuthError> {
        let _busy = self.loading.raise();
        self.error = None;
        tracing::debug!(email = %credentials.email, "register");
        let result = self.api.register(credentials).await;
        self.accept(result, REGISTRATION_FAILED)
    }

    /// Notify the server, then clear the local session. Never fails: a server
    /// error is logged and the local state is cleared regardless.
    pub async fn logout(&mut self) {
        let _busy = self.loading.raise();
        if let Some(token) = self.token.get()
            && let Err(error) = self.api.logout(&token).await
        {
            tracing::warn!(%error, "logout request failed; clearing local session anyway");
        }
        self.clear_session();
        self.error = None;
    }

    /// Adopt a persisted credential and validate it against `/auth/me`.
    ///
    /// Returns `Ok(false)` when nothing was persisted.
    ///
    /// # Errors
    ///
    /// Returns the [`Self::fetch_current_user`] error when the stored
    /// credential is rejected; credential and storage are cleared first.
    pub async fn restore_from_storage(&mut self) -> Result<bool, AuthError> {
        let Some(token) = self.storage.load() else {
            return Ok(false);
        };
        self.token.set(Some(token));
        self.fetch_current_user().await?;
        Ok(self.is_authenticated())
    }

    /// Refresh the profile for the current credential. No-op when signed out.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RequestFailed`] if the server rejects the call. The
    /// credential is treated as invalid: token, profile and storage are cleared.
    pub async fn fetch_current_user(&mut self) -> Result<(), AuthError> {
        let Some(token) = self.token.get() else {
            return Ok(());
        };
        let _busy = self.loading.raise();
        match self.api.current_user(&token).await {
            Ok(user) => {
                self.user = Some(user);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "credential rejected; clearing session");
                self.clear_session();
                Err(self.fail(&error, FETCH_USER_FAILED))
            }
        }
    }

    fn accept(
        &mut self,
        result: Result<AuthResponse, ApiError>,
        fallback: &str,
    ) -> Result<(), AuthError> {
        let response = result.map_err(|error| self.fail(&error, fallback))?;
        if let Err(error) = self.storage.store(&response.access_token) {
            tracing::warn!(%error, "could not persist credential; session lasts until exit");
        }
        self.token.set(Some(response.access_token));
        self.user = Some(response.user);
        Ok(())
    }

    fn fail(&mut self, error: &ApiError, fallback: &str) -> AuthError {
        let error = AuthError::from_api(error, fallback);
        self.error = Some(error.to_string());
        error
    }

    fn clear_session(&mut self) {
        self.token.set(None);
        self.user = None;
        if let Err(error) = self.storage.delete() {
            tracing::warn!(%error, "could not remove persisted credential");
        }
    }
}
