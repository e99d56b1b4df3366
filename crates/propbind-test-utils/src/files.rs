//! Property files in temporary directories.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Write `content` to `name` inside a fresh temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the file is needed.
pub fn property_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("property_file: failed to create temp dir: {e}"));
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap_or_else(|e| panic!("property_file: failed to write {}: {e}", path.display()));
    (dir, path)
}
