use dunce::canonicalize;
use std::path::{Path, PathBuf};

/// Absolute form of `path` for handing to another process.
///
/// Existing paths are canonicalized (without UNC prefixes on Windows);
/// paths that do not exist yet are joined onto the current directory.
pub fn absolute_path(path: &Path) -> PathBuf {
    if let Ok(p) = canonicalize(path) {
        return p;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
