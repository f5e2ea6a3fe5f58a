//! Error taxonomy of the video service.

use crate::ports::{MediaToolError, RepositoryError, StorageError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("File size must be less than {max_mb}MB")]
    PayloadTooLarge { max_mb: f64 },

    #[error("Video duration must be between {min} and {max} seconds")]
    InvalidMedia { duration: f64, min: f64, max: f64 },

    #[error("Invalid trim value, start time must be greater than 0 and less than the video duration")]
    InvalidRange { start: f64, end: f64 },

    #[error("Could not read the video duration: {0}")]
    ProbeFailed(String),

    #[error("Media processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Failed to download or access file: {}", .0.display())]
    DownloadFailed(PathBuf),

    #[error("Error while merging videos: {0}")]
    MergeFailed(#[source] Box<VideoError>),

    #[error("Error generating shareable link: {0}")]
    LinkGenerationFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MediaToolError> for VideoError {
    fn from(err: MediaToolError) -> Self {
        match err {
            MediaToolError::ProbeFailed(msg) => VideoError::ProbeFailed(msg),
            MediaToolError::ProcessingFailed(msg) => VideoError::ProcessingFailed(msg),
        }
    }
}

impl VideoError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            VideoError::InvalidRequest(_) | VideoError::InvalidRange { .. } => 400,
            VideoError::NotFound(_) => 404,
            VideoError::PayloadTooLarge { .. } => 413,
            VideoError::InvalidMedia { .. } | VideoError::ProbeFailed(_) => 422,
            VideoError::ProcessingFailed(_)
            | VideoError::DownloadFailed(_)
            | VideoError::MergeFailed(_)
            | VideoError::LinkGenerationFailed(_)
            | VideoError::Storage(_)
            | VideoError::Repository(_)
            | VideoError::Io(_) => 500,
        }
    }

    /// Machine-readable code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            VideoError::InvalidRequest(_) => "INVALID_REQUEST",
            VideoError::NotFound(_) => "NOT_FOUND",
            VideoError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            VideoError::InvalidMedia { .. } => "INVALID_MEDIA",
            VideoError::InvalidRange { .. } => "INVALID_RANGE",
            VideoError::ProbeFailed(_) => "PROBE_FAILED",
            VideoError::ProcessingFailed(_) => "PROCESSING_FAILED",
            VideoError::DownloadFailed(_) => "DOWNLOAD_FAILED",
            VideoError::MergeFailed(_) => "MERGE_FAILED",
            VideoError::LinkGenerationFailed(_) => "LINK_GENERATION_FAILED",
            VideoError::Storage(_) => "STORAGE_ERROR",
            VideoError::Repository(_) => "DATABASE_ERROR",
            VideoError::Io(_) => "IO_ERROR",
        }
    }

    /// Errors caused by the request itself rather than by a collaborator
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}
