//! Credential persistence configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_keyring_service() -> String {
    "legally-cli".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// OS keychain service name the bearer token is stored under.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Directory for the file fallback. Empty means `~/.legally`.
    #[serde(default)]
    pub credentials_dir: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keyring_service: default_keyring_service(),
            credentials_dir: String::new(),
        }
    }
}

impl AuthConfig {
    /// Resolved fallback directory, if one can be determined.
    #[must_use]
    pub fn credentials_dir(&self) -> Option<PathBuf> {
        if self.credentials_dir.is_empty() {
            dirs::home_dir().map(|home| home.join(".legally"))
        } else {
            Some(PathBuf::from(&self.credentials_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let config = AuthConfig {
            credentials_dir: "/tmp/legally-test".into(),
            ..Default::default()
        };
        assert_eq!(
            config.credentials_dir(),
            Some(PathBuf::from("/tmp/legally-test"))
        );
    }

    #[test]
    fn default_service_name() {
        assert_eq!(AuthConfig::default().keyring_service, "legally-cli");
    }
}
