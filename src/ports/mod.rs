//! Ports - Trait definitions for the collaborators of the video service.

pub mod media;
pub mod repository;
pub mod storage;

pub use media::{MediaTool, MediaToolError};
pub use repository::{RepositoryError, VideoRepository};
pub use storage::{StorageError, StoragePort};
