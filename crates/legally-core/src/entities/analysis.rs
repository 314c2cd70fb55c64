use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AnalysisStatus, EventKind};
use crate::timestamp;

/// The unit under live synchronization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    pub id: String,
    pub contract_id: String,
    pub status: AnalysisStatus,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub formatted_output: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default, with = "timestamp::utc_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::utc_option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::utc_option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Analysis {
    /// Apply a streamed status if the forward-only table allows it.
    ///
    /// Returns `true` when the status changed.
    pub fn advance_status(&mut self, next: AnalysisStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

/// One record of the live event stream. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisEvent {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(with = "timestamp::utc")]
    pub timestamp: DateTime<Utc>,
}

impl AnalysisEvent {
    #[must_use]
    pub fn event_kind(&self) -> EventKind {
        EventKind::from_kind(&self.kind)
    }

    /// `payload.status`, if it names a known status.
    #[must_use]
    pub fn payload_status(&self) -> Option<AnalysisStatus> {
        self.payload
            .get("status")
            .and_then(serde_json::Value::as_str)
            .and_then(AnalysisStatus::parse)
    }

    #[must_use]
    pub fn payload_message(&self) -> Option<&str> {
        self.payload.get("message").and_then(serde_json::Value::as_str)
    }
}

/// Body of `POST /analyses`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub contract_id: String,
    pub output_language: String,
}

/// Body of `POST /analyses/{id}/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub section: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
