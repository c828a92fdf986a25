//! Inventory enumeration.
//!
//! Walks an inventory directory tree and yields candidate image paths,
//! filtered by a fixed allow-list of extensions.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extensions eligible for indexing, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Recursively enumerates image files under `root`.
///
/// Returns a fresh, lazy traversal each call; ordering is filesystem
/// traversal order and is not guaranteed sorted. Fails only when `root`
/// does not exist. Unreadable entries inside the tree are skipped.
pub fn enumerate_images(root: &Path) -> io::Result<impl Iterator<Item = PathBuf>> {
    if !root.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("inventory root not found: {}", root.display()),
        ));
    }

    let walk = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_image_path(entry.path()))
        .map(|entry| entry.into_path());

    Ok(walk)
}

/// Returns whether the path carries an allow-listed image extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.iter().any(|allowed| *allowed == ext)
        })
        .unwrap_or(false)
}
