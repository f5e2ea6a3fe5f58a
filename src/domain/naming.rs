//! Filename and storage-key derivation.

use std::path::Path;
use uuid::Uuid;

/// Prefix under which every blob is stored.
pub const STORAGE_PREFIX: &str = "videos";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Split `name` into stem and extension (without the dot).
/// `clip.final.mp4` gives `("clip.final", Some("mp4"))`.
pub fn split_filename(name: &str) -> (&str, Option<&str>) {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let extension = path.extension().and_then(|e| e.to_str());
    (stem, extension)
}

fn with_extension(base: String, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", base, ext),
        None => base,
    }
}

/// Collision-free storage key for a display filename: `videos/<stem>_<uuid>.<ext>`.
pub fn storage_key(filename: &str) -> String {
    let (stem, extension) = split_filename(filename);
    let unique = with_extension(format!("{}_{}", stem, Uuid::new_v4()), extension);
    format!("{}/{}", STORAGE_PREFIX, unique)
}

/// Display filename for a trimmed copy: `<stem>_trimmed_<uuid>.<ext>`.
pub fn trimmed_filename(filename: &str) -> String {
    let (stem, extension) = split_filename(filename);
    with_extension(format!("{}_trimmed_{}", stem, Uuid::new_v4()), extension)
}

/// Storage key used verbatim for an already unique filename.
pub fn key_for(filename: &str) -> String {
    format!("{}/{}", STORAGE_PREFIX, filename)
}

/// Local scratch name that cannot collide inside a shared workspace.
pub fn local_name(filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), filename)
}

/// A bare filename: no separators, not empty, not `.` or `..`.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Last component of a client-supplied filename, if usable.
pub fn client_filename(raw: &str) -> Option<String> {
    let name = raw.rsplit(|c: char| c == '/' || c == '\\').next()?.trim();
    is_plain_filename(name).then(|| name.to_string())
}
