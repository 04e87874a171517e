//! Blob storage for uploaded resumes.
//!
//! `LocalFileStage` keeps files under a directory on disk (default).
//! `S3FileStage` targets an S3 / MinIO bucket and is selected when `S3_BUCKET` is set.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::errors::AppError;

/// Carried in `AppState` as `Arc<dyn FileStage>`.
#[async_trait]
pub trait FileStage: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError>;

    /// `None` if no blob exists under `key`.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, AppError>;

    /// Returns false if no blob existed under `key`.
    async fn remove(&self, key: &str) -> Result<bool, AppError>;
}

pub struct LocalFileStage {
    root: PathBuf,
}

impl LocalFileStage {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::Storage(format!("Rejected storage key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStage for LocalFileStage {
    async fn put(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create file: {e}")))?;
        let written = match file.write_all(&bytes).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        drop(file);

        if let Err(e) = written {
            // Partial blobs have no record pointing at them.
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!("Failed to remove partial blob {}: {cleanup}", path.display());
            }
            return Err(AppError::Storage(format!("Failed to write file: {e}")));
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, AppError> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read file: {e}"))),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, AppError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {e}"))),
        }
    }
}

pub struct S3FileStage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStage {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl FileStage for S3FileStage {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, AppError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Ok(None)
            }
            Err(e) => return Err(AppError::Storage(format!("S3 download failed: {e}"))),
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;
        Ok(Some(data.into_bytes()))
    }

    async fn remove(&self, key: &str) -> Result<bool, AppError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => {}
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                return Ok(false)
            }
            Err(e) => return Err(AppError::Storage(format!("S3 lookup failed: {e}"))),
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn stage() -> (LocalFileStage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let stage = LocalFileStage::new(dir.path().join("uploads")).await.unwrap();
        (stage, dir)
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let (stage, dir) = stage().await;
        stage
            .put("resumes/a.pdf", Bytes::from_static(b"%PDF-1.4"), "application/pdf")
            .await
            .unwrap();

        assert!(dir.path().join("uploads/resumes/a.pdf").exists());
        let data = stage.get("resumes/a.pdf").await.unwrap().unwrap();
        assert_eq!(&data[..], b"%PDF-1.4");

        assert!(stage.remove("resumes/a.pdf").await.unwrap());
        assert!(stage.get("resumes/a.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let (stage, _dir) = stage().await;
        assert!(stage.get("resumes/none.pdf").await.unwrap().is_none());
        assert!(!stage.remove("resumes/none.pdf").await.unwrap());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_write_leaves_no_partial_file() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let (stage, dir) = stage().await;
        let target = dir.path().join("uploads/resumes/full.pdf");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink("/dev/full", &target).unwrap();

        let result = stage
            .put("resumes/full.pdf", Bytes::from(vec![b'%'; 64 * 1024]), "application/pdf")
            .await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(std::fs::symlink_metadata(&target).is_err());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let (stage, _dir) = stage().await;
        for key in ["../secret", "/etc/passwd", "resumes/../../x", ""] {
            let result = stage.put(key, Bytes::from_static(b"x"), "text/plain").await;
            assert!(matches!(result, Err(AppError::Storage(_))), "key {key:?}");
        }
    }
}
