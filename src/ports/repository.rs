use crate::domain::video::{NewVideo, VideoRecord, VideoUpdate};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Metadata store failure. Callers do not distinguish sub-kinds.
#[derive(Debug, Error)]
#[error("Metadata store error: {0}")]
pub struct RepositoryError(#[from] pub sqlx::Error);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Persist a new record
    async fn create(&self, video: NewVideo) -> Result<VideoRecord, RepositoryError>;

    /// Fetch a record by id
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, RepositoryError>;

    /// Apply `changes` to an existing record, returning the updated row
    async fn update(
        &self,
        id: Uuid,
        changes: VideoUpdate,
    ) -> Result<Option<VideoRecord>, RepositoryError>;

    /// All records, oldest first
    async fn list(&self) -> Result<Vec<VideoRecord>, RepositoryError>;
}
