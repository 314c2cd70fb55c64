use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Tier;
use crate::timestamp;

/// The authenticated account as returned by `/auth/me` and the login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub tier: Tier,
    #[serde(default)]
    pub contracts_analyzed: u32,
    #[serde(default)]
    pub analyses_remaining: u32,
    #[serde(default, with = "timestamp::utc_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Premium accounts are unmetered; free accounts need remaining quota.
    #[must_use]
    pub const fn can_analyze(&self) -> bool {
        matches!(self.tier, Tier::Premium) || self.analyses_remaining > 0
    }
}

/// Body of `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserProfile,
}

fn default_token_type() -> String {
    "bearer".into()
}
