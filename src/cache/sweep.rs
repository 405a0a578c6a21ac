//! Age-based pruning of generations
//!
//! The current pointer is left untouched, even when the generation it names
//! is among the pruned files. A later `read_latest` then reports NotFound.

use std::fs;
use std::time::{Duration, SystemTime};

use crate::cache::handle::CacheHandle;
use crate::cache::store::CacheStore;
use crate::core::error::{CacheError, CacheResult};

impl CacheStore {
    /// Remove generations last modified more than `max_age` ago
    pub fn prune_older_than(&self, handle: &CacheHandle, max_age: Duration) -> CacheResult<Vec<String>> {
        self.prune_older_than_at(handle, max_age, SystemTime::now())
    }

    /// Remove generations last modified strictly before `now - max_age`.
    ///
    /// Only regular files directly inside the generation directory are
    /// considered. The returned paths are sorted.
    pub fn prune_older_than_at(
        &self,
        handle: &CacheHandle,
        max_age: Duration,
        now: SystemTime,
    ) -> CacheResult<Vec<String>> {
        let dir = handle.generation_dir();
        if !dir.is_dir() {
            return Err(CacheError::not_found("prune", &dir));
        }

        let cutoff = now.checked_sub(max_age).unwrap_or(SystemTime::UNIX_EPOCH);
        let entries = fs::read_dir(&dir).map_err(|e| CacheError::io("prune", &dir, e))?;

        let mut removed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io("prune", &dir, e))?;
            let path = entry.path();
            let metadata = entry.metadata().map_err(|e| CacheError::io("prune", &path, e))?;
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified().map_err(|e| CacheError::io("prune", &path, e))?;
            if modified < cutoff {
                fs::remove_file(&path).map_err(|e| CacheError::io("prune", &path, e))?;
                removed.push(self.display(&path));
            }
        }

        removed.sort();
        tracing::debug!(hash = handle.hash(), removed = removed.len(), "pruned generations");
        Ok(removed)
    }
}
