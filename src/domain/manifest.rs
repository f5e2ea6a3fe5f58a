//! Concat-demuxer manifest.

use std::path::{Path, PathBuf};

/// Render one `file '<path>'` line per input, in the given order.
///
/// Single quotes inside a path are closed, escaped and reopened (`'\''`),
/// which is the quoting the concat demuxer understands.
pub fn render(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|path| format!("file '{}'\n", quote(path)))
        .collect()
}

fn quote(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Write the manifest to `manifest_path`.
pub async fn write(manifest_path: &Path, inputs: &[PathBuf]) -> std::io::Result<()> {
    tokio::fs::write(manifest_path, render(inputs)).await
}
