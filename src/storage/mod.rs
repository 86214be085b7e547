//! File storage collaborator and upload pre-validation
//!
//! Screenshots and avatars are uploaded to bucket-addressed object storage;
//! the size and MIME checks here mirror the client-side pre-checks and are
//! not a guarantee the backing store enforces anything.

mod local;

pub use local::LocalStorage;

use async_trait::async_trait;

/// Maximum accepted size for a submission screenshot
pub const MAX_SCREENSHOT_BYTES: usize = 10 * 1024 * 1024;

/// Maximum accepted size for a profile avatar
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image MIME types for uploads
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// Bucket name for submission screenshots
pub const SCREENSHOTS_BUCKET: &str = "screenshots";

/// Bucket name for profile avatars
pub const AVATARS_BUCKET: &str = "avatars";

/// Errors from upload validation or the storage backend
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported file type {0:?}, use JPG, PNG or GIF")]
    UnsupportedType(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Object storage the engine uploads screenshots and avatars to
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `bytes` under `bucket`/`path` and return an addressable URL
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, UploadError>;
}

/// Pre-check a submission screenshot (<= 10MB, allowed image type)
pub fn validate_screenshot(size: usize, content_type: &str) -> Result<(), UploadError> {
    validate_image(size, content_type, MAX_SCREENSHOT_BYTES)
}

/// Pre-check a profile avatar (<= 5MB, allowed image type)
pub fn validate_avatar(size: usize, content_type: &str) -> Result<(), UploadError> {
    validate_image(size, content_type, MAX_AVATAR_BYTES)
}

fn validate_image(size: usize, content_type: &str, limit: usize) -> Result<(), UploadError> {
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(UploadError::UnsupportedType(content_type.to_string()));
    }
    Ok(())
}

/// File extension for an accepted image MIME type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screenshot_size_limit() {
        assert!(validate_screenshot(MAX_SCREENSHOT_BYTES, "image/png").is_ok());
        let err = validate_screenshot(MAX_SCREENSHOT_BYTES + 1, "image/png").unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
    }

    #[test]
    fn test_avatar_size_limit_is_tighter() {
        assert!(validate_avatar(MAX_AVATAR_BYTES, "image/jpeg").is_ok());
        assert!(validate_avatar(MAX_AVATAR_BYTES + 1, "image/jpeg").is_err());
        // A file fine as a screenshot can still be too big as an avatar
        assert!(validate_screenshot(6 * 1024 * 1024, "image/jpeg").is_ok());
        assert!(validate_avatar(6 * 1024 * 1024, "image/jpeg").is_err());
    }

    #[test]
    fn test_mime_allowlist() {
        assert!(validate_screenshot(10, "image/gif").is_ok());
        let err = validate_screenshot(10, "application/pdf").unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("text/plain"), None);
    }
}
