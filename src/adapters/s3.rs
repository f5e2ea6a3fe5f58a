use crate::ports::storage::{StorageError, StoragePort};
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};
use std::path::Path;
use std::time::Duration;

/// S3-compatible object store.
#[derive(Clone, Debug)]
pub struct S3Adapter {
    store: AmazonS3,
    bucket: String,
}

impl S3Adapter {
    /// Credentials come from the standard `AWS_*` environment variables.
    pub fn new(bucket: String, region: String, endpoint: Option<String>) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(Self { store, bucket })
    }
}

#[async_trait]
impl StoragePort for S3Adapter {
    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let start = std::time::Instant::now();
        let location = ObjectPath::from(key);

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(error = %other, bucket = %self.bucket, key, "S3 download failed");
                StorageError::DownloadFailed(other.to_string())
            }
        })?;
        let body = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        tokio::fs::write(local_path, &body).await?;

        tracing::info!(
            bucket = %self.bucket,
            key,
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );
        Ok(())
    }

    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        let start = std::time::Instant::now();
        let body = tokio::fs::read(local_path).await?;
        let size = body.len();
        let location = ObjectPath::from(key);

        self.store
            .put(&location, PutPayload::from(body))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %self.bucket, key, "S3 upload failed");
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let location = ObjectPath::from(key);
        let url = self
            .store
            .signed_url(Method::GET, &location, ttl)
            .await
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        Ok(url.to_string())
    }
}
