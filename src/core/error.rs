//! Cache error types
//!
//! Every variant carries the operation name and the path (or identifier hash)
//! involved, so the rendered message is enough to diagnose a failure.

use std::path::{Path, PathBuf};

/// Errors raised by the cache store
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Unusable configuration (e.g. a root that cannot be created)
    #[error("{field} - {reason}")]
    ConfigInvalid { field: String, reason: String },

    /// Unsupported data kind name
    #[error("unsupported data kind '{0}'")]
    DataKindInvalid(String),

    /// Pointer, generation file, or generation directory is missing
    #[error("{op}: not found: {path}")]
    NotFound { op: &'static str, path: PathBuf },

    /// Erase target is not a directory
    #[error("{op}: path is a file or isn't a directory ({path})")]
    PathInvalid { op: &'static str, path: PathBuf },

    /// Underlying filesystem failure
    #[error("{op}: {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content does not fit the handle's data kind
    #[error("{kind}: {reason}")]
    InvalidContent { kind: String, reason: String },

    /// Malformed JSON in an input, pointer, or generation
    #[error("{op}: {path}: invalid JSON: {source}")]
    Json {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(op: &'static str, path: &Path, source: serde_json::Error) -> Self {
        CacheError::Json {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn not_found(op: &'static str, path: &Path) -> Self {
        CacheError::NotFound {
            op,
            path: path.to_path_buf(),
        }
    }

    /// Map an I/O error, turning `ErrorKind::NotFound` into `CacheError::NotFound`
    pub fn from_io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(op, path)
        } else {
            Self::io(op, path, source)
        }
    }

    /// Stable error code, printed by the CLI ahead of the message
    pub fn code(&self) -> &'static str {
        match self {
            CacheError::ConfigInvalid { .. } => "CONFIG_INVALID",
            CacheError::DataKindInvalid(_) => "DATA_KIND_INVALID",
            CacheError::NotFound { .. } => "NOT_FOUND",
            CacheError::PathInvalid { .. } => "PATH_INVALID",
            CacheError::Io { .. } => "IO_ERROR",
            CacheError::InvalidContent { .. } => "INVALID_CONTENT",
            CacheError::Json { .. } => "JSON_ERROR",
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
