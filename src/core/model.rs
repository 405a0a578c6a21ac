//! Result model emitted by the CLI
//!
//! Every command maps what the store returns onto `ResultItem`s before
//! rendering.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::cache::meta::CurrentPointer;
use crate::cache::reader::GenerationInfo;

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Hash,
    Generation,
    Pointer,
    Content,
    Removed,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Identifier hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Modification time in milliseconds since epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime_ms: Option<i64>,

    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Encoding of `excerpt` when it is not plain text (`base64`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// One rendered result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    pub kind: Kind,

    /// Path as reported by the store (relative or absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Text payload (hash, text content)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured payload (pointer, structured content)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    pub meta: Meta,

    /// Non-fatal warnings raised while producing this item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Exact bytes for raw output; JSON output carries them base64-encoded
    #[serde(skip)]
    pub bytes: Option<Vec<u8>>,
}

impl ResultItem {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            path: None,
            excerpt: None,
            data: None,
            meta: Meta::default(),
            warnings: Vec::new(),
            bytes: None,
        }
    }

    /// Identifier hash
    pub fn hash(hash: impl Into<String>) -> Self {
        let hash = hash.into();
        let mut item = Self::new(Kind::Hash);
        item.excerpt = Some(hash.clone());
        item.meta.hash = Some(hash);
        item
    }

    /// Freshly written generation
    pub fn generation(path: impl Into<String>, hash: &str) -> Self {
        let mut item = Self::new(Kind::Generation);
        item.path = Some(path.into());
        item.meta.hash = Some(hash.to_string());
        item
    }

    /// Generation found on disk
    pub fn listed(info: &GenerationInfo, hash: &str) -> Self {
        let mut item = Self::generation(info.path.clone(), hash);
        item.meta.size = Some(info.size);
        item.meta.mtime_ms = Some(info.mtime_ms);
        item
    }

    /// Current pointer
    pub fn pointer(pointer: &CurrentPointer, hash: &str) -> Self {
        let mut item = Self::new(Kind::Pointer);
        item.path = Some(pointer.path.clone());
        item.data = serde_json::to_value(pointer).ok();
        item.meta.hash = Some(hash.to_string());
        item
    }

    /// Latest content, as text
    pub fn text(text: impl Into<String>, hash: &str) -> Self {
        let mut item = Self::new(Kind::Content);
        item.excerpt = Some(text.into());
        item.meta.hash = Some(hash.to_string());
        item
    }

    /// Latest content, as opaque bytes
    pub fn bytes(bytes: Vec<u8>, hash: &str) -> Self {
        let mut item = Self::new(Kind::Content);
        item.excerpt = Some(STANDARD.encode(&bytes));
        item.meta.encoding = Some("base64".to_string());
        item.meta.hash = Some(hash.to_string());
        item.meta.size = Some(bytes.len() as u64);
        item.bytes = Some(bytes);
        item
    }

    /// Latest content, as a structured value
    pub fn value(value: serde_json::Value, hash: &str) -> Self {
        let mut item = Self::new(Kind::Content);
        item.data = Some(value);
        item.meta.hash = Some(hash.to_string());
        item
    }

    /// Removed file
    pub fn removed(path: impl Into<String>, hash: &str) -> Self {
        let mut item = Self::new(Kind::Removed);
        item.path = Some(path.into());
        item.meta.hash = Some(hash.to_string());
        item
    }

    /// Set structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
