//! Contract files prepared for upload.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use legally_core::upload::mime_for_extension;

use crate::error::ApiError;

/// Progress callback: `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Body chunk size handed to the transport between progress reports.
pub(crate) const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// An in-memory document with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadFile {
    #[must_use]
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a file from disk, deriving the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::File`] if the path has no file name or cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::File(format!("{} has no file name", path.display())))?
            .to_string();
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(legally_core::upload::MIME_UNKNOWN, mime_for_extension);
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::File(format!("read {}: {e}", path.display())))?;
        Ok(Self::new(filename, mime_type, Bytes::from(data)))
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Split the payload into transport-sized chunks without copying.
    pub(crate) fn chunks(&self) -> Vec<Bytes> {
        let len = self.data.len();
        (0..len)
            .step_by(UPLOAD_CHUNK_BYTES)
            .map(|start| self.data.slice(start..len.min(start + UPLOAD_CHUNK_BYTES)))
            .collect()
    }
}
