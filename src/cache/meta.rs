//! Current-pointer metadata management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cache::handle::DataKind;
use crate::core::error::{CacheError, CacheResult};

/// Pointer to the latest generation, stored in `<root>/<hash>_current.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPointer {
    /// Generation filename
    pub file: String,

    /// `<hash>/<file>`, relative to `<root>/files`
    pub path: String,

    /// Data kind the generation was written with
    #[serde(rename = "dataType")]
    pub data_kind: DataKind,

    /// `cache` or `json.cache`
    pub extension: String,

    /// Creation time (Unix seconds); absent in older pointer files
    #[serde(default)]
    pub timestamp: i64,
}

impl CurrentPointer {
    pub fn new(hash: &str, file: &str, data_kind: DataKind, timestamp: i64) -> Self {
        Self {
            file: file.to_string(),
            path: format!("{}/{}", hash, file),
            data_kind,
            extension: data_kind.extension().to_string(),
            timestamp,
        }
    }
}

/// Write the pointer through a temp file and rename it into place
pub fn write_pointer(path: &Path, pointer: &CurrentPointer) -> CacheResult<()> {
    let json = serde_json::to_string(pointer).map_err(|e| CacheError::json("write_pointer", path, e))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    fs::write(tmp, json).map_err(|e| CacheError::io("write_pointer", tmp, e))?;
    fs::rename(tmp, path).map_err(|e| CacheError::io("write_pointer", path, e))?;
    Ok(())
}

/// Read a pointer file
pub fn read_pointer(path: &Path) -> CacheResult<CurrentPointer> {
    let content = fs::read_to_string(path).map_err(|e| CacheError::from_io("read_pointer", path, e))?;
    serde_json::from_str(&content).map_err(|e| CacheError::json("read_pointer", path, e))
}
