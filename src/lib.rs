//! Videoverse - Video Management Backend
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (records, requests, naming, concat manifest)
//! - ports/: Trait definitions (object store, metadata store, media tool)
//! - adapters/: Concrete implementations (filesystem, S3, SQLite, ffmpeg)
//! - application/: The video service and its request workspaces
//! - http/: Axum routes and the response envelope
//! - config: Environment configuration
//!
//! # Features
//! - `s3`: S3-compatible object storage through `object_store`

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod ports;

// Re-exports for convenience
pub use application::{MediaLimits, VideoService};
pub use config::Config;
pub use error::VideoError;
