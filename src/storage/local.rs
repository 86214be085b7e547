//! Local-filesystem storage backend
//!
//! Stands in for the hosted object store in tests and the CLI. Files land
//! under `<root>/<bucket>/<path>` and the returned URL is the absolute path.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{FileStorage, UploadError, extension_for};

/// Object storage rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, UploadError> {
        if extension_for(content_type).is_none() {
            return Err(UploadError::UnsupportedType(content_type.to_string()));
        }

        let target = self.root.join(bucket).join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytes)?;

        Ok(target.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let url = storage
            .upload("screenshots", "u1/1.png", b"img", "image/png")
            .await
            .unwrap();

        assert!(url.ends_with("u1/1.png"));
        assert_eq!(std::fs::read(dir.path().join("screenshots/u1/1.png")).unwrap(), b"img");
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage
            .upload("screenshots", "u1/1.bin", b"x", "application/octet-stream")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
    }
}
