use super::signing::UrlSigner;
use crate::ports::storage::{StorageError, StoragePort};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Local filesystem object store. Keys map to paths under `root`.
#[derive(Clone, Debug)]
pub struct FsAdapter {
    root: PathBuf,
    signer: UrlSigner,
}

impl FsAdapter {
    pub async fn new(root: impl Into<PathBuf>, signer: UrlSigner) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root, signer })
    }

    /// Map a key onto the filesystem, refusing anything that could leave `root`.
    pub fn key_to_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains('\\') || key.contains('\0') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let relative = Path::new(key);
        let all_normal = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !all_normal {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Path of `key` if the signature and expiry check out.
    pub async fn verified_path(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
    ) -> Result<Option<PathBuf>, StorageError> {
        let now = chrono::Utc::now().timestamp();
        if !self.signer.verify(key, expires, signature, now) {
            return Ok(None);
        }
        let path = self.key_to_path(key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(Some(path))
    }
}

#[async_trait]
impl StoragePort for FsAdapter {
    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let source = self.key_to_path(key)?;
        if !tokio::fs::try_exists(&source).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = tokio::fs::copy(&source, local_path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("{} -> {}: {}", key, local_path.display(), e))
        })?;
        tracing::debug!(key, local = %local_path.display(), bytes, "Local storage download");
        Ok(())
    }

    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        let destination = self.key_to_path(key)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Copy beside the destination, then rename over it, so an overwrite is never half-written
        let partial = destination.with_file_name(format!(".{}.part", Uuid::new_v4()));
        let copied = tokio::fs::copy(local_path, &partial).await;
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(StorageError::UploadFailed(format!(
                    "{} -> {}: {}",
                    local_path.display(),
                    key,
                    e
                )));
            }
        };
        if let Err(e) = tokio::fs::rename(&partial, &destination).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!("{}: {}", key, e)));
        }

        tracing::info!(key, bytes, "Local storage upload successful");
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        self.key_to_path(key)?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StorageError::SigningFailed(format!("invalid expiry: {}", e)))?;
        let expires = chrono::Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| StorageError::SigningFailed("expiry out of range".to_string()))?
            .timestamp();
        Ok(self.signer.url(key, expires))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn adapter(root: &Path) -> FsAdapter {
        FsAdapter::new(root.join("store"), UrlSigner::new("secret", "http://localhost:8000"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let dir = tempdir().unwrap();
        let fs = adapter(dir.path()).await;
        let source = dir.path().join("source.mp4");
        std::fs::write(&source, b"video-bytes").unwrap();

        fs.upload(&source, "videos/clip.mp4").await.unwrap();
        let local = dir.path().join("scratch").join("copy.mp4");
        fs.download("videos/clip.mp4", &local).await.unwrap();

        assert_eq!(std::fs::read(&local).unwrap(), b"video-bytes");
    }

    #[tokio::test]
    async fn test_upload_overwrites_existing_key() {
        let dir = tempdir().unwrap();
        let fs = adapter(dir.path()).await;
        let first = dir.path().join("first.mp4");
        let second = dir.path().join("second.mp4");
        std::fs::write(&first, b"long original content").unwrap();
        std::fs::write(&second, b"trimmed").unwrap();

        fs.upload(&first, "videos/clip.mp4").await.unwrap();
        fs.upload(&second, "videos/clip.mp4").await.unwrap();

        let stored = fs.key_to_path("videos/clip.mp4").unwrap();
        assert_eq!(std::fs::read(&stored).unwrap(), b"trimmed");
        // no partial files left next to the object
        let siblings = std::fs::read_dir(stored.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
    }

    #[tokio::test]
    async fn test_download_missing_key() {
        let dir = tempdir().unwrap();
        let fs = adapter(dir.path()).await;
        let result = fs.download("videos/missing.mp4", &dir.path().join("x.mp4")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempdir().unwrap();
        let fs = adapter(dir.path()).await;
        for key in ["../escape.mp4", "/etc/passwd", "videos/../../x", "", "videos\\x.mp4"] {
            assert!(
                matches!(fs.key_to_path(key), Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_signed_url_round_trips_through_verification() {
        let dir = tempdir().unwrap();
        let fs = adapter(dir.path()).await;
        let source = dir.path().join("source.mp4");
        std::fs::write(&source, b"x").unwrap();
        fs.upload(&source, "videos/clip.mp4").await.unwrap();

        let url = fs
            .signed_url("videos/clip.mp4", Duration::from_secs(3600))
            .await
            .unwrap();
        let query = url.split_once('?').unwrap().1;
        let mut expires = 0;
        let mut signature = "";
        for pair in query.split('&') {
            match pair.split_once('=').unwrap() {
                ("expires", value) => expires = value.parse().unwrap(),
                ("signature", value) => signature = value,
                _ => {}
            }
        }

        let path = fs.verified_path("videos/clip.mp4", expires, signature).await.unwrap();
        assert_eq!(path, Some(fs.key_to_path("videos/clip.mp4").unwrap()));
        let forged = fs.verified_path("videos/clip.mp4", expires + 1, signature).await.unwrap();
        assert_eq!(forged, None);
    }
}
