use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaToolError {
    #[error("Duration probe failed: {0}")]
    ProbeFailed(String),

    #[error("Media processing failed: {0}")]
    ProcessingFailed(String),
}

/// External media tool used for every codec-level operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Container duration in seconds
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaToolError>;

    /// Stream-copy `input` into `output`, bounded by the optional start/end seconds
    async fn trim(
        &self,
        input: &Path,
        start: Option<f64>,
        end: Option<f64>,
        output: &Path,
    ) -> Result<(), MediaToolError>;

    /// Concatenate the files listed in a concat-demuxer manifest into `output`
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), MediaToolError>;
}
