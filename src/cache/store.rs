//! Cache store - writes generations and keeps the current pointer fresh
//!
//! Generation files are named after the wall-clock second they were written
//! in. Two writes for the same identifier within one second share a name, so
//! the later one replaces the earlier one.

use chrono::{DateTime, Local};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::cache::filter::{apply_filter, FilterStep};
use crate::cache::handle::{CacheHandle, Content, DataKind};
use crate::cache::meta::{write_pointer, CurrentPointer};
use crate::core::config::{ResolvedConfig, StoreConfig};
use crate::core::error::{CacheError, CacheResult};
use crate::core::hash::hash_identifier;
use crate::core::paths::{display_path, ensure_dir};
use crate::core::util::generation_stamp;

/// A filesystem-backed cache rooted at one directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    config: ResolvedConfig,
}

/// Result of a successful write
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generation filename
    pub file: String,

    /// Path of the generation file, rendered per the configured path mode
    pub path: String,

    /// Pointer written for this generation
    pub pointer: CurrentPointer,

    /// Non-fatal warnings raised while writing
    pub warnings: Vec<String>,
}

impl CacheStore {
    /// Validate the configuration and open the store
    pub fn open(config: StoreConfig) -> CacheResult<Self> {
        let config = config.resolve()?;
        tracing::debug!(
            root = %config.root.display(),
            algorithm = config.algorithm.name(),
            path_mode = config.path_mode.name(),
            "opened cache store"
        );
        Ok(Self { config })
    }

    /// Warnings raised while resolving the configuration
    pub fn warnings(&self) -> &[String] {
        &self.config.warnings
    }

    /// Directory-safe hash of an identifier
    pub fn hash_identifier(&self, identifier: &str) -> String {
        hash_identifier(identifier, self.config.algorithm)
    }

    /// Bind a handle to an identifier
    pub fn handle(&self, identifier: &str, kind: DataKind) -> CacheHandle {
        CacheHandle::new(
            self.hash_identifier(identifier),
            kind,
            self.config.root.clone(),
        )
    }

    /// Render a path under the root per the configured path mode
    pub fn display(&self, path: &Path) -> String {
        display_path(path, &self.config.root, self.config.path_mode)
    }

    /// Write a new generation and point the identifier at it
    pub fn write(
        &self,
        handle: &CacheHandle,
        content: Content,
        filter: &[FilterStep],
    ) -> CacheResult<Generation> {
        self.write_at(handle, content, filter, Local::now())
    }

    /// Write a new generation stamped with `now`
    pub fn write_at(
        &self,
        handle: &CacheHandle,
        content: Content,
        filter: &[FilterStep],
        now: DateTime<Local>,
    ) -> CacheResult<Generation> {
        let mut warnings = Vec::new();
        let kind = handle.kind();
        let bytes = encode(handle, content, filter, &mut warnings)?;

        let file = format!("{}.{}", generation_stamp(&now), kind.extension());
        let dir = handle.generation_dir();
        let file_path = dir.join(&file);

        ensure_dir(&dir, self.config.dir_mode).map_err(|e| CacheError::io("write", &dir, e))?;
        fs::write(&file_path, &bytes).map_err(|e| CacheError::io("write", &file_path, e))?;

        let pointer = CurrentPointer::new(handle.hash(), &file, kind, now.timestamp());
        write_pointer(&handle.pointer_path(), &pointer)?;

        tracing::debug!(
            hash = handle.hash(),
            file = %file,
            bytes = bytes.len(),
            "wrote generation"
        );

        Ok(Generation {
            file,
            path: self.display(&file_path),
            pointer,
            warnings,
        })
    }
}

/// Serialize content for the handle's kind, applying the filter to
/// structured values
fn encode(
    handle: &CacheHandle,
    content: Content,
    filter: &[FilterStep],
    warnings: &mut Vec<String>,
) -> CacheResult<Vec<u8>> {
    let kind = handle.kind();

    if !kind.is_structured() {
        let bytes = match (kind, content) {
            (DataKind::Text, Content::Bytes(bytes)) => String::from_utf8(bytes)
                .map_err(|e| CacheError::InvalidContent {
                    kind: kind.to_string(),
                    reason: format!("content is not valid UTF-8: {}", e),
                })?
                .into_bytes(),
            (_, Content::Bytes(bytes)) => bytes,
            (_, Content::Text(text)) => text.into_bytes(),
            (_, content) => return Err(mismatch(kind, &content)),
        };

        if !filter.is_empty() {
            let warning = format!("filter ignored for {} content", kind);
            tracing::warn!(hash = handle.hash(), kind = kind.name(), "{}", warning);
            warnings.push(warning);
        }
        return Ok(bytes);
    }

    let value: Value = match (kind, content) {
        (DataKind::StructuredJson, Content::Json(value)) => value,
        (DataKind::StructuredFromJsonString, Content::Text(text)) => serde_json::from_str(&text)
            .map_err(|e| CacheError::json("write", &handle.generation_dir(), e))?,
        (DataKind::StructuredFromJsonString, Content::Bytes(bytes)) => {
            serde_json::from_slice(&bytes)
                .map_err(|e| CacheError::json("write", &handle.generation_dir(), e))?
        }
        (_, content) => return Err(mismatch(kind, &content)),
    };

    let value = if filter.is_empty() {
        value
    } else {
        match apply_filter(&value, filter) {
            Ok(selected) => selected.clone(),
            Err(step) => {
                let warning = format!("filter step '{}' not found; storing an empty result", step);
                tracing::warn!(hash = handle.hash(), step = %step, "{}", warning);
                warnings.push(warning);
                Value::Null
            }
        }
    };

    serde_json::to_vec(&value).map_err(|e| CacheError::json("write", &handle.generation_dir(), e))
}

fn mismatch(kind: DataKind, content: &Content) -> CacheError {
    CacheError::InvalidContent {
        kind: kind.to_string(),
        reason: format!("cannot store {} content", content_name(content)),
    }
}

fn content_name(content: &Content) -> &'static str {
    match content {
        Content::Bytes(_) => "byte",
        Content::Text(_) => "text",
        Content::Json(_) => "structured",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::meta::read_pointer;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::tempdir;

    fn open(root: &Path) -> CacheStore {
        CacheStore::open(StoreConfig::new(root)).unwrap()
    }

    fn at(secs: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, 3, 4, secs).unwrap()
    }

    #[test]
    fn test_write_text_generation() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("greeting", DataKind::Text);

        let generation = store.write_at(&handle, "hello".into(), &[], at(5)).unwrap();
        assert_eq!(generation.file, "20240102-030405.cache");
        assert!(generation.warnings.is_empty());

        let file = handle.generation_dir().join(&generation.file);
        assert_eq!(fs::read_to_string(&file).unwrap(), "hello");
        assert_eq!(generation.path, file.to_string_lossy());

        let pointer = read_pointer(&handle.pointer_path()).unwrap();
        assert_eq!(pointer.file, generation.file);
        assert_eq!(pointer.path, format!("{}/{}", handle.hash(), generation.file));
        assert_eq!(pointer.data_kind, DataKind::Text);
        assert_eq!(pointer.timestamp, at(5).timestamp());
    }

    #[test]
    fn test_write_structured_normalizes_json() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("feed", DataKind::StructuredFromJsonString);

        let generation = store
            .write_at(&handle, "{ \"a\" :  [1, 2] }".into(), &[], at(0))
            .unwrap();
        assert_eq!(generation.file, "20240102-030400.json.cache");

        let stored = fs::read_to_string(handle.generation_dir().join(&generation.file)).unwrap();
        assert_eq!(stored, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_write_relative_path_mode() {
        let temp = tempdir().unwrap();
        let config = StoreConfig {
            path_mode: "relative".to_string(),
            ..StoreConfig::new(temp.path())
        };
        let store = CacheStore::open(config).unwrap();
        let handle = store.handle("rel", DataKind::Text);

        let generation = store.write_at(&handle, "x".into(), &[], at(1)).unwrap();
        assert_eq!(
            generation.path,
            format!("/files/{}/20240102-030401.cache", handle.hash())
        );
    }

    #[test]
    fn test_write_with_filter() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("filtered", DataKind::StructuredJson);
        let value = json!({"items": [{"a": 1}]});

        let filter = vec![
            FilterStep::Key("items".into()),
            FilterStep::Index(0),
            FilterStep::Key("a".into()),
        ];
        let generation = store.write_at(&handle, value.into(), &filter, at(2)).unwrap();
        assert!(generation.warnings.is_empty());

        let stored = fs::read_to_string(handle.generation_dir().join(&generation.file)).unwrap();
        assert_eq!(stored, "1");
    }

    #[test]
    fn test_write_with_missing_filter_step_warns() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("filtered", DataKind::StructuredJson);
        let value = json!({"items": [{"a": 1}]});

        let filter = vec![
            FilterStep::Key("items".into()),
            FilterStep::Index(0),
            FilterStep::Key("missing".into()),
        ];
        let generation = store.write_at(&handle, value.into(), &filter, at(3)).unwrap();
        assert_eq!(generation.warnings.len(), 1);
        assert!(generation.warnings[0].contains("missing"));

        let stored = fs::read_to_string(handle.generation_dir().join(&generation.file)).unwrap();
        assert_eq!(stored, "null");
        assert!(handle.pointer_path().exists());
    }

    #[test]
    fn test_filter_on_text_is_ignored() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("plain", DataKind::Text);

        let generation = store
            .write_at(&handle, "body".into(), &[FilterStep::Key("a".into())], at(4))
            .unwrap();
        assert_eq!(generation.warnings.len(), 1);
    }

    #[test]
    fn test_write_twice_same_dir() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("twice", DataKind::Text);

        store.write_at(&handle, "one".into(), &[], at(10)).unwrap();
        store.write_at(&handle, "two".into(), &[], at(11)).unwrap();

        let count = fs::read_dir(handle.generation_dir()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_same_second_writes_share_a_file() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("burst", DataKind::Text);

        store.write_at(&handle, "first".into(), &[], at(20)).unwrap();
        let generation = store.write_at(&handle, "second".into(), &[], at(20)).unwrap();

        let count = fs::read_dir(handle.generation_dir()).unwrap().count();
        assert_eq!(count, 1);
        let stored = fs::read_to_string(handle.generation_dir().join(&generation.file)).unwrap();
        assert_eq!(stored, "second");
    }

    #[test]
    fn test_write_rejects_mismatched_content() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("mismatch", DataKind::StructuredJson);

        let err = store.write(&handle, "not a value".into(), &[]).unwrap_err();
        assert_eq!(err.code(), "INVALID_CONTENT");
        assert!(!handle.generation_dir().exists());
        assert!(!handle.pointer_path().exists());
    }

    #[test]
    fn test_write_rejects_malformed_json_string() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("broken", DataKind::StructuredFromJsonString);

        let err = store.write(&handle, "{oops".into(), &[]).unwrap_err();
        assert_eq!(err.code(), "JSON_ERROR");
        assert!(!handle.pointer_path().exists());
    }

    #[test]
    fn test_failed_generation_write_leaves_pointer_alone() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("blocked", DataKind::Text);

        store.write_at(&handle, "kept".into(), &[], at(30)).unwrap();
        // A directory squatting on the next generation's name makes the write fail
        fs::create_dir(handle.generation_dir().join("20240102-030431.cache")).unwrap();

        let err = store.write_at(&handle, "lost".into(), &[], at(31)).unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");

        let pointer = read_pointer(&handle.pointer_path()).unwrap();
        assert_eq!(pointer.file, "20240102-030430.cache");
    }

    #[test]
    fn test_hash_identifier_matches_handle() {
        let temp = tempdir().unwrap();
        let store = open(temp.path());
        let handle = store.handle("same", DataKind::RawBytes);
        assert_eq!(store.hash_identifier("same"), handle.hash());
        assert_eq!(store.hash_identifier("same"), store.hash_identifier("same"));
    }
}
