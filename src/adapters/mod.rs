//! Adapters - Concrete implementations of ports.

pub mod ffmpeg;
pub mod local;
pub mod sqlite;

#[cfg(feature = "s3")]
pub mod s3;
