//! Local filesystem storage backend.

pub mod fs;
pub mod signing;

pub use fs::FsAdapter;
pub use signing::UrlSigner;
