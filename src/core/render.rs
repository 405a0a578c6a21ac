//! Renderer module
//!
//! Streams a ResultSet to a writer as jsonl, json, or raw payloads. Raw
//! mode writes byte content verbatim so cached binaries survive a
//! `kao read --format raw > out` round trip.

use std::io::{self, Write};

use crate::core::model::{ResultItem, ResultSet};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Writes result sets in the configured format
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Write `result_set` to `out`. An empty set writes nothing except in
    /// json mode, which always emits an array.
    pub fn write_to<W: Write>(&self, out: &mut W, result_set: &ResultSet) -> io::Result<()> {
        match self.config.format {
            OutputFormat::Jsonl => {
                for (i, item) in result_set.items.iter().enumerate() {
                    if i > 0 && self.config.pretty {
                        out.write_all(b"\n")?;
                    }
                    self.write_json(out, item)?;
                    out.write_all(b"\n")?;
                }
            }
            OutputFormat::Json => {
                self.write_json(out, &result_set.items)?;
                out.write_all(b"\n")?;
            }
            OutputFormat::Raw => {
                for item in &result_set.items {
                    write_raw(out, item)?;
                }
            }
        }
        out.flush()
    }

    fn write_json<W: Write, T: serde::Serialize + ?Sized>(
        &self,
        out: &mut W,
        value: &T,
    ) -> io::Result<()> {
        if self.config.pretty {
            serde_json::to_writer_pretty(&mut *out, value)?;
        } else {
            serde_json::to_writer(&mut *out, value)?;
        }
        Ok(())
    }
}

/// One item's payload: bytes as-is, otherwise the excerpt, data, or path
/// followed by a newline
fn write_raw<W: Write>(out: &mut W, item: &ResultItem) -> io::Result<()> {
    if let Some(bytes) = &item.bytes {
        return out.write_all(bytes);
    }

    let line = item
        .excerpt
        .clone()
        .or_else(|| item.data.as_ref().map(|data| data.to_string()))
        .or_else(|| item.path.clone());
    match line {
        Some(line) => writeln!(out, "{}", line),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ResultItem;

    fn sample() -> ResultSet {
        let mut result_set = ResultSet::new();
        result_set.push(ResultItem::removed("/files/abc/1.cache", "abc"));
        result_set.push(ResultItem::removed("/files/abc/2.cache", "abc"));
        result_set
    }

    fn render(format: OutputFormat, pretty: bool, result_set: &ResultSet) -> Vec<u8> {
        let renderer = Renderer::with_config(RenderConfig::with_pretty(format, pretty));
        let mut out = Vec::new();
        renderer.write_to(&mut out, result_set).unwrap();
        out
    }

    #[test]
    fn test_render_jsonl() {
        let output = String::from_utf8(render(OutputFormat::Jsonl, false, &sample())).unwrap();

        assert!(output.contains("/files/abc/1.cache"));
        assert!(output.contains("/files/abc/2.cache"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_render_jsonl_empty_writes_nothing() {
        assert!(render(OutputFormat::Jsonl, false, &ResultSet::new()).is_empty());
        assert_eq!(render(OutputFormat::Json, false, &ResultSet::new()), b"[]\n");
    }

    #[test]
    fn test_render_json() {
        let output = String::from_utf8(render(OutputFormat::Json, false, &sample())).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_raw() {
        let mut result_set = sample();
        result_set.push(ResultItem::text("hello", "abc"));
        result_set.push(ResultItem::value(serde_json::json!({"a": 1}), "abc"));

        let output = String::from_utf8(render(OutputFormat::Raw, false, &result_set)).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            vec!["/files/abc/1.cache", "/files/abc/2.cache", "hello", r#"{"a":1}"#]
        );
    }

    #[test]
    fn test_render_raw_bytes_verbatim() {
        let bytes = vec![0, 0x9f, 0x92, 0x96, 0xff];
        let result_set = ResultSet::from_iter([ResultItem::bytes(bytes.clone(), "abc")]);
        assert_eq!(render(OutputFormat::Raw, false, &result_set), bytes);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("raw".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
        assert!("md".parse::<OutputFormat>().is_err());
    }
}
