//! Full teardown of one identifier

use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::cache::handle::CacheHandle;
use crate::cache::store::CacheStore;
use crate::core::error::{CacheError, CacheResult};

impl CacheStore {
    /// Delete the identifier's generation tree and its pointer file.
    ///
    /// Everything is enumerated before anything is deleted: files go first,
    /// then directories deepest-first. Returns the removed file paths, pointer
    /// first. A failure midway leaves a partially erased tree.
    pub fn erase_all(&self, handle: &CacheHandle) -> CacheResult<Vec<String>> {
        let dir = handle.generation_dir();
        if !dir.is_dir() {
            return Err(CacheError::PathInvalid {
                op: "erase",
                path: dir,
            });
        }

        let mut files: Vec<PathBuf> = Vec::new();
        let mut directories: Vec<PathBuf> = Vec::new();

        let pointer = handle.pointer_path();
        if pointer.is_file() {
            files.push(pointer);
        }

        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_else(|| dir.clone());
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                CacheError::io("erase", &path, source)
            })?;

            if entry.file_type().is_dir() {
                directories.push(entry.into_path());
            } else {
                files.push(entry.into_path());
            }
        }

        for file in &files {
            fs::remove_file(file).map_err(|e| CacheError::io("erase", file, e))?;
        }
        for directory in directories.iter().rev() {
            fs::remove_dir(directory).map_err(|e| CacheError::io("erase", directory, e))?;
        }

        tracing::debug!(
            hash = handle.hash(),
            files = files.len(),
            directories = directories.len(),
            "erased identifier"
        );

        Ok(files.iter().map(|path| self.display(path)).collect())
    }
}
