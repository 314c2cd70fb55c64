use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use legally_config::AuthConfig;

use crate::error::AuthError;

const KEYRING_USER: &str = "access-token";
const CREDENTIALS_FILE_NAME: &str = "credentials";

/// Durable storage for the bearer credential.
pub trait CredentialStore: Send + Sync {
    /// The persisted credential, if any. Empty values count as absent.
    fn load(&self) -> Option<String>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if no backend accepted the token.
    fn store(&self, token: &str) -> Result<(), AuthError>;

    /// Remove the persisted credential. Removing nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenStoreError`] if a stored file cannot be removed.
    fn delete(&self) -> Result<(), AuthError>;
}

/// OS keychain storage with a `0600` file fallback.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: Option<String>,
    dir: Option<PathBuf>,
}

impl KeyringStore {
    /// Keychain entry under `service`, falling back to `<dir>/credentials`.
    #[must_use]
    pub fn new(service: impl Into<String>, dir: Option<PathBuf>) -> Self {
        Self {
            service: Some(service.into()),
            dir,
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.keyring_service.clone(), config.credentials_dir())
    }

    /// Store that never touches the keychain. Used by tests and headless hosts.
    #[must_use]
    pub fn file_only(dir: impl Into<PathBuf>) -> Self {
        Self {
            service: None,
            dir: Some(dir.into()),
        }
    }

    /// Which backend currently holds the credential (for status display).
    #[must_use]
    pub fn source(&self) -> Option<&'static str> {
        if self.load_keyring().is_some() {
            return Some("keyring");
        }
        if self.load_file().is_some() {
            return Some("file");
        }
        None
    }

    fn entry(&self) -> Option<keyring::Entry> {
        let service = self.service.as_deref()?;
        match keyring::Entry::new(service, KEYRING_USER) {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::debug!(%error, "keyring unavailable");
                None
            }
        }
    }

    fn load_keyring(&self) -> Option<String> {
        self.entry()?
            .get_password()
            .ok()
            .filter(|token| !token.is_empty())
    }

    fn store_keyring(&self, token: &str) -> bool {
        let Some(entry) = self.entry() else {
            return false;
        };
        if let Err(error) = entry.set_password(token) {
            tracing::warn!(%error, "keyring store failed; falling back to file");
            return false;
        }
        // Some backends accept writes without persisting them.
        if self.load_keyring().as_deref() == Some(token) {
            true
        } else {
            tracing::warn!("keyring did not retain the token; falling back to file");
            false
        }
    }

    fn credentials_path(&self) -> Result<PathBuf, AuthError> {
        self.dir
            .as_deref()
            .map(|dir| dir.join(CREDENTIALS_FILE_NAME))
            .ok_or_else(|| {
                AuthError::TokenStoreError(
                    "home directory not found; cannot store credentials".into(),
                )
            })
    }

    fn store_file(&self, token: &str) -> Result<(), AuthError> {
        let path = self.credentials_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::TokenStoreError(format!("mkdir {}: {e}", parent.display()))
            })?;
            restrict(parent, 0o700);
        }
        fs::write(&path, token)
            .map_err(|e| AuthError::TokenStoreError(format!("write {}: {e}", path.display())))?;
        restrict(&path, 0o600);
        Ok(())
    }

    fn load_file(&self) -> Option<String> {
        let path = self.credentials_path().ok()?;
        fs::read_to_string(&path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl CredentialStore for KeyringStore {
    fn load(&self) -> Option<String> {
        self.load_keyring().or_else(|| self.load_file())
    }

    fn store(&self, token: &str) -> Result<(), AuthError> {
        if self.store_keyring(token) {
            // Only one backend holds the token at a time.
            if let Ok(path) = self.credentials_path()
                && path.exists()
            {
                let _ = fs::remove_file(path);
            }
            return Ok(());
        }
        self.store_file(token)
    }

    fn delete(&self) -> Result<(), AuthError> {
        if let Some(entry) = self.entry() {
            let _ = entry.delete_credential();
        }
        let Ok(path) = self.credentials_path() else {
            return Ok(());
        };
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                AuthError::TokenStoreError(format!("failed to delete {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        tracing::warn!("failed to chmod {mode:o} {}: {e}", path.display());
    }
}

#[cfg(not(unix))]
fn restrict(_path: &Path, _mode: u32) {}

/// Process-local storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore(Mutex<Option<String>>);

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self(Mutex::new(Some(token.into())))
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.is_empty())
    }

    fn store(&self, token: &str) -> Result<(), AuthError> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), AuthError> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
