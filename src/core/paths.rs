//! Cache layout and path rendering
//!
//! ```text
//! <root>/<hash>_current.json
//! <root>/files/<hash>/<YYYYMMDD-HHMMSS>.<extension>
//! ```
//!
//! Paths handed back to callers use '/' as separator. In relative mode they
//! are rooted at the cache root (`/files/<hash>/<file>`).

use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::config::PathMode;

/// Directory holding every identifier's generation directory
pub const FILES_DIR: &str = "files";

/// Suffix of the per-identifier pointer file
pub const POINTER_SUFFIX: &str = "_current.json";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// `<root>/files/<hash>`
pub fn generation_dir(root: &Path, hash: &str) -> PathBuf {
    root.join(FILES_DIR).join(hash)
}

/// `<root>/<hash>_current.json`
pub fn pointer_path(root: &Path, hash: &str) -> PathBuf {
    root.join(format!("{}{}", hash, POINTER_SUFFIX))
}

/// Render a path under the cache root for callers
pub fn display_path(path: &Path, root: &Path, mode: PathMode) -> String {
    match mode {
        PathMode::Absolute => normalize_path(path),
        PathMode::Relative => match make_relative(path, root) {
            Some(relative) => format!("/{}", relative),
            None => normalize_path(path),
        },
    }
}

/// Create a directory (and parents) with the given permission mode.
/// An already existing directory is not an error.
pub fn ensure_dir(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path)
}
