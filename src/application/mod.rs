//! Application layer - The video service composed over the ports.

pub mod video_service;
pub mod workspace;

pub use video_service::{MediaLimits, VideoService};
pub use workspace::TempWorkspace;
