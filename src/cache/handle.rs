//! Cache handles and data kinds

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::CacheError;
use crate::core::paths::{generation_dir, pointer_path};

/// Logical shape of cached content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    RawBytes,
    #[serde(alias = "www", alias = "string")]
    Text,
    #[serde(alias = "array")]
    StructuredJson,
    #[serde(alias = "www_json")]
    StructuredFromJsonString,
}

impl DataKind {
    pub fn name(&self) -> &'static str {
        match self {
            DataKind::RawBytes => "raw_bytes",
            DataKind::Text => "text",
            DataKind::StructuredJson => "structured_json",
            DataKind::StructuredFromJsonString => "structured_from_json_string",
        }
    }

    /// Whether content is stored as JSON
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            DataKind::StructuredJson | DataKind::StructuredFromJsonString
        )
    }

    /// Generation file extension
    pub fn extension(&self) -> &'static str {
        if self.is_structured() {
            "json.cache"
        } else {
            "cache"
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DataKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "raw_bytes" | "bytes" | "raw" => Ok(DataKind::RawBytes),
            "text" | "string" | "www" => Ok(DataKind::Text),
            "structured_json" | "json" | "array" => Ok(DataKind::StructuredJson),
            "structured_from_json_string" | "json_string" | "www_json" => {
                Ok(DataKind::StructuredFromJsonString)
            }
            _ => Err(CacheError::DataKindInvalid(s.to_string())),
        }
    }
}

/// Cache content, in or out
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Bytes(Vec<u8>),
    Text(String),
    Json(serde_json::Value),
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Content::Json(value)
    }
}

/// Coordinates of one identifier in a store.
///
/// A handle owns nothing on disk; it only knows how to compute paths.
#[derive(Debug, Clone)]
pub struct CacheHandle {
    hash: String,
    kind: DataKind,
    root: PathBuf,
}

impl CacheHandle {
    pub(crate) fn new(hash: String, kind: DataKind, root: PathBuf) -> Self {
        Self { hash, kind, root }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// `<root>/files/<hash>`
    pub fn generation_dir(&self) -> PathBuf {
        generation_dir(&self.root, &self.hash)
    }

    /// `<root>/<hash>_current.json`
    pub fn pointer_path(&self) -> PathBuf {
        pointer_path(&self.root, &self.hash)
    }
}
