use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Uploaded document metadata. Text, page count and language are filled in
/// asynchronously by the server after upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contract {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub file_size: u64,
    pub mime_type: String,
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default, with = "timestamp::utc_option")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::utc_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_analysis_id: Option<String>,
}

/// One page of `GET /contracts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractPage {
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// Response of `POST /contracts/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub contract_id: String,
    pub filename: String,
    #[serde(default)]
    pub status: String,
}
