//! General application configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default contracts per page.
const fn default_page_size() -> u32 {
    10
}

fn default_output_language() -> String {
    "english".into()
}

/// Default notification lifetime in milliseconds.
const fn default_notification_ttl_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Page size for `GET /contracts`.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Language requested when starting an analysis.
    #[serde(default = "default_output_language")]
    pub output_language: String,

    /// How long a notification stays visible. 0 keeps it until dismissed.
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            output_language: default_output_language(),
            notification_ttl_ms: default_notification_ttl_ms(),
        }
    }
}

impl GeneralConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero page size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.page_size".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.output_language, "english");
        assert_eq!(config.notification_ttl_ms, 5000);
    }

    #[test]
    fn zero_page_size_is_invalid() {
        let config = GeneralConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
