//! Cache reader - pointer lookup and latest-generation loading

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::cache::handle::{CacheHandle, Content, DataKind};
use crate::cache::meta::{read_pointer, CurrentPointer};
use crate::cache::store::CacheStore;
use crate::core::error::{CacheError, CacheResult};
use crate::core::util::get_mtime_ms;

/// A generation file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInfo {
    pub file: String,
    pub path: String,
    pub size: u64,
    pub mtime_ms: i64,
}

impl CacheStore {
    /// Read the identifier's current pointer
    pub fn read_pointer(&self, handle: &CacheHandle) -> CacheResult<CurrentPointer> {
        let pointer = read_pointer(&handle.pointer_path())?;
        if pointer.data_kind != handle.kind() {
            tracing::warn!(
                hash = handle.hash(),
                stored = pointer.data_kind.name(),
                requested = handle.kind().name(),
                "pointer was written with a different data kind"
            );
        }
        Ok(pointer)
    }

    /// Load and decode the generation the pointer names
    pub fn read_latest(&self, handle: &CacheHandle) -> CacheResult<Content> {
        let pointer = self.read_pointer(handle)?;
        let path = generation_file(handle, &pointer)?;
        let bytes = fs::read(&path).map_err(|e| CacheError::from_io("read_latest", &path, e))?;

        match handle.kind() {
            DataKind::RawBytes => Ok(Content::Bytes(bytes)),
            DataKind::Text => String::from_utf8(bytes).map(Content::Text).map_err(|e| {
                CacheError::InvalidContent {
                    kind: handle.kind().to_string(),
                    reason: format!("{} is not valid UTF-8: {}", path.display(), e),
                }
            }),
            DataKind::StructuredJson | DataKind::StructuredFromJsonString => {
                serde_json::from_slice(&bytes)
                    .map(Content::Json)
                    .map_err(|e| CacheError::json("read_latest", &path, e))
            }
        }
    }

    /// List generation files for an identifier, sorted by name
    pub fn list_generations(&self, handle: &CacheHandle) -> CacheResult<Vec<GenerationInfo>> {
        let dir = handle.generation_dir();
        let entries = fs::read_dir(&dir).map_err(|e| CacheError::from_io("list", &dir, e))?;

        let mut generations = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io("list", &dir, e))?;
            let path = entry.path();
            let metadata = entry.metadata().map_err(|e| CacheError::io("list", &path, e))?;
            if !metadata.is_file() {
                continue;
            }

            generations.push(GenerationInfo {
                file: entry.file_name().to_string_lossy().to_string(),
                path: self.display(&path),
                size: metadata.len(),
                mtime_ms: get_mtime_ms(&path).map_err(|e| CacheError::io("list", &path, e))?,
            });
        }

        generations.sort_by(|a, b| a.file.cmp(&b.file));
        Ok(generations)
    }
}

/// Locate the pointer's generation inside the handle's directory. The file
/// name must be a single plain component.
fn generation_file(handle: &CacheHandle, pointer: &CurrentPointer) -> CacheResult<PathBuf> {
    let mut components = Path::new(&pointer.file).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(handle.generation_dir().join(&pointer.file)),
        _ => Err(CacheError::PathInvalid {
            op: "read_latest",
            path: handle.pointer_path(),
        }),
    }
}
