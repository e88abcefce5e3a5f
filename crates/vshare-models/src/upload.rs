//! Upload constraints, enforced before the orchestrator runs.

use thiserror::Error;

/// Maximum accepted raw upload size (500 MB).
pub const MAX_UPLOAD_BYTES: i64 = 500 * 1024 * 1024;

/// Container formats accepted for raw uploads.
pub const ALLOWED_FORMATS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "webm"];

/// Rejection reasons for an upload, surfaced as validation errors.
#[derive(Debug, Clone, Error)]
pub enum UploadValidationError {
    #[error("unsupported file format: {0} (allowed: mp4, avi, mov, mkv, flv, webm)")]
    UnsupportedFormat(String),

    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("file too large: {0} bytes (max 500 MB)")]
    TooLarge(i64),

    #[error("title must be between 1 and 200 characters")]
    InvalidTitle,
}

/// Check a format tag against the allow-list. Case-insensitive,
/// leading dot tolerated.
pub fn validate_format(format: &str) -> Result<String, UploadValidationError> {
    let normalized = format.trim_start_matches('.').to_ascii_lowercase();
    if ALLOWED_FORMATS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(UploadValidationError::UnsupportedFormat(format.to_string()))
    }
}

/// Check a declared file size against the bounds.
pub fn validate_size(size: i64) -> Result<(), UploadValidationError> {
    if size <= 0 {
        return Err(UploadValidationError::EmptyFile);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadValidationError::TooLarge(size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_allow_list() {
        assert_eq!(validate_format("mp4").unwrap(), "mp4");
        assert_eq!(validate_format(".MOV").unwrap(), "mov");
        assert_eq!(validate_format("webm").unwrap(), "webm");
        assert!(validate_format("exe").is_err());
        assert!(validate_format("").is_err());
    }

    #[test]
    fn test_size_bounds() {
        assert!(validate_size(0).is_err());
        assert!(validate_size(-1).is_err());
        assert!(validate_size(1).is_ok());
        assert!(validate_size(MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_size(MAX_UPLOAD_BYTES + 1).is_err());
    }
}
