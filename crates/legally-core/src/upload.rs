//! Client-side upload preconditions.
//!
//! Checked before any network call. A violation is a [`CoreError::Validation`]
//! carrying the message shown to the user.

use crate::errors::CoreError;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_UNKNOWN: &str = "application/octet-stream";

/// Accepted contract document types.
pub const ALLOWED_MIME_TYPES: [&str; 2] = [MIME_PDF, MIME_DOCX];

/// 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const INVALID_TYPE_MESSAGE: &str = "Invalid file type. Please upload a PDF or DOCX file.";
pub const TOO_LARGE_MESSAGE: &str = "File size exceeds 10MB limit.";

/// Validate a file's declared MIME type and size.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when the type is not PDF/DOCX or the
/// size exceeds [`MAX_UPLOAD_BYTES`]. Type is checked first.
pub fn validate_upload(mime_type: &str, size: u64) -> Result<(), CoreError> {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(CoreError::Validation(INVALID_TYPE_MESSAGE.into()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(TOO_LARGE_MESSAGE.into()));
    }
    Ok(())
}

/// Map a file extension to the MIME type the server expects.
#[must_use]
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => MIME_PDF,
        "docx" => MIME_DOCX,
        _ => MIME_UNKNOWN,
    }
}

/// Upload progress as a whole percentage: `round(loaded * 100 / total)`.
///
/// Returns `None` when the total is unknown (zero).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn progress_percent(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = ((loaded as f64) * 100.0 / (total as f64)).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MIB: u64 = 1024 * 1024;

    #[rstest]
    #[case(MIME_PDF, 9 * MIB)]
    #[case(MIME_DOCX, 1)]
    #[case(MIME_PDF, MAX_UPLOAD_BYTES)]
    fn accepts_supported_documents(#[case] mime: &str, #[case] size: u64) {
        assert_eq!(validate_upload(mime, size), Ok(()));
    }

    #[rstest]
    #[case("text/plain", 10, INVALID_TYPE_MESSAGE)]
    #[case("application/msword", 10, INVALID_TYPE_MESSAGE)]
    #[case(MIME_PDF, MAX_UPLOAD_BYTES + 1, TOO_LARGE_MESSAGE)]
    #[case("text/plain", MAX_UPLOAD_BYTES + 1, INVALID_TYPE_MESSAGE)]
    fn rejects_with_reason(#[case] mime: &str, #[case] size: u64, #[case] reason: &str) {
        assert_eq!(
            validate_upload(mime, size),
            Err(CoreError::Validation(reason.to_string()))
        );
    }

    #[test]
    fn extension_mapping_is_case_insensitive() {
        assert_eq!(mime_for_extension("PDF"), MIME_PDF);
        assert_eq!(mime_for_extension("docx"), MIME_DOCX);
        assert_eq!(mime_for_extension("txt"), MIME_UNKNOWN);
    }

    #[rstest]
    #[case(0, 200, Some(0))]
    #[case(1, 3, Some(33))]
    #[case(2, 3, Some(67))]
    #[case(200, 200, Some(100))]
    #[case(5, 0, None)]
    fn progress_rounds_to_nearest(#[case] loaded: u64, #[case] total: u64, #[case] expected: Option<u8>) {
        assert_eq!(progress_percent(loaded, total), expected);
    }
}
