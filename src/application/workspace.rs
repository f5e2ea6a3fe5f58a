use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Request-scoped scratch directory.
///
/// The directory and everything written into it is removed when the guard is
/// dropped, so every early return and `?` releases it. `close` does the same
/// but reports a failed removal.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    pub fn create_in(root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix("videoverse-")
            .tempdir_in(root)?;
        tracing::debug!(path = %dir.path().display(), "Created workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace. Nothing is created.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove workspace");
        }
    }
}
