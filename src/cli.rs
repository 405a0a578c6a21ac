//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::filter::{parse_filter, FilterStep};
use crate::cache::handle::{Content, DataKind};
use crate::cache::store::CacheStore;
use crate::core::config::StoreConfig;
use crate::core::model::{ResultItem, ResultSet};
use crate::core::render::{OutputFormat, RenderConfig, Renderer};

/// kao - a per-identifier, filesystem-backed cache of timestamped generations.
#[derive(Parser, Debug)]
#[command(name = "kao")]
#[command(
    author,
    version,
    about,
    long_about = r#"kao keeps successive generations of content for an identifier as
timestamped files, plus a small pointer file naming the latest one.

Layout under ROOT:
    <hash>_current.json                    pointer to the latest generation
    files/<hash>/<YYYYMMDD-HHMMSS>.cache   raw/text generation
    files/<hash>/<YYYYMMDD-HHMMSS>.json.cache  structured generation

Data kinds: raw_bytes, text, structured_json, structured_from_json_string

Examples:
    kao write feed --kind text --value "hello"
    kao write api --kind structured_from_json_string --file body.json --filter items.0
    kao read api --kind structured_from_json_string
    kao prune feed --max-age 86400
    kao erase feed
"#
)]
pub struct Cli {
    /// Cache root directory.
    #[arg(
        long,
        global = true,
        env = "KAO_ROOT",
        default_value = "cache",
        value_name = "ROOT",
        long_help = "Cache root directory. Created (with parents) if it does not exist.\n\n\
Construction fails if ROOT cannot be created or is not a directory."
    )]
    pub root: PathBuf,

    /// Hash algorithm for identifiers (sha256/sha1/md5/xxh3/xxh3-128).
    #[arg(
        long,
        global = true,
        env = "KAO_HASH_ALGORITHM",
        default_value = "sha256",
        value_name = "ALGORITHM",
        long_help = "Hash algorithm used to derive an identifier's directory name:\n\
sha256, sha1, md5, xxh3 or xxh3-128. md5 matches roots written by earlier kao releases.\n\n\
Unknown or empty names fall back to sha256 with a warning."
    )]
    pub algorithm: String,

    /// Path mode for reported paths (relative/absolute).
    #[arg(
        long,
        global = true,
        env = "KAO_PATH_MODE",
        default_value = "absolute",
        value_name = "MODE",
        long_help = "How paths are reported: `absolute`, or `relative` to ROOT\n\
(e.g. /files/<hash>/<file>). Invalid values fall back to absolute with a warning."
    )]
    pub path_mode: String,

    /// Permission mode (octal) for created directories.
    #[arg(
        long,
        global = true,
        env = "KAO_DIR_MODE",
        default_value = "750",
        value_name = "OCTAL",
        value_parser = parse_octal
    )]
    pub dir_mode: u32,

    /// Output format (jsonl/json/raw). Raw writes raw_bytes content verbatim;
    /// jsonl/json carry it base64-encoded.
    #[arg(long, global = true, default_value = "jsonl", value_name = "FORMAT")]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identifier and data kind shared by the cache commands
#[derive(Args, Debug)]
pub struct HandleArgs {
    /// Cache identifier (any string, e.g. a URL).
    #[arg(value_name = "ID")]
    pub id: String,

    /// Data kind (raw_bytes/text/structured_json/structured_from_json_string).
    #[arg(long, default_value = "text", value_name = "KIND")]
    pub kind: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the directory hash for an identifier.
    Hash {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Write a new generation.
    #[command(
        long_about = "Write a new generation for ID and point the identifier at it.\n\n\
Content comes from --value, --file, or stdin (in that order of preference).\n\
For structured kinds the content is parsed as JSON and re-encoded canonically.\n\
Each --filter is a dotted path (items.0.name); all-digit segments are indices.\n\
A missing filter step stores an empty (null) result and emits a warning."
    )]
    Write {
        #[command(flatten)]
        handle: HandleArgs,

        /// Content given inline.
        #[arg(long, value_name = "VALUE", conflicts_with = "file")]
        value: Option<String>,

        /// Read content from a file.
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Filter path applied to structured content.
        #[arg(long, value_name = "PATH")]
        filter: Vec<String>,
    },

    /// Print the latest generation's content.
    Read {
        #[command(flatten)]
        handle: HandleArgs,
    },

    /// Print the current pointer.
    Pointer {
        #[command(flatten)]
        handle: HandleArgs,
    },

    /// List generations on disk.
    List {
        #[command(flatten)]
        handle: HandleArgs,
    },

    /// Remove generations older than --max-age seconds.
    Prune {
        #[command(flatten)]
        handle: HandleArgs,

        /// Maximum age in seconds.
        #[arg(long, value_name = "SECS")]
        max_age: u64,
    },

    /// Remove every generation and the pointer for an identifier.
    Erase {
        #[command(flatten)]
        handle: HandleArgs,
    },
}

fn parse_octal(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s.trim_start_matches("0o"), 8)
        .map_err(|e| format!("invalid octal mode '{}': {}", s, e))
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let renderer = Renderer::with_config(RenderConfig::with_pretty(format, cli.pretty));

    let config = StoreConfig {
        root: cli.root,
        hash_algorithm: cli.algorithm,
        path_mode: cli.path_mode,
        dir_mode: cli.dir_mode,
    };

    let result_set = match cli.command {
        Commands::Hash { id } => {
            let store = CacheStore::open(config)?;
            let mut result_set = ResultSet::new();
            result_set.push(ResultItem::hash(store.hash_identifier(&id)));
            result_set
        }

        Commands::Write {
            handle,
            value,
            file,
            filter,
        } => {
            let kind: DataKind = handle.kind.parse()?;
            let filter: Vec<FilterStep> = filter.iter().flat_map(|f| parse_filter(f)).collect();
            let content = load_content(kind, value, file)?;

            let store = CacheStore::open(config)?;
            let handle = store.handle(&handle.id, kind);
            let generation = store
                .write(&handle, content, &filter)
                .with_context(|| format!("Failed to write generation for {}", handle.hash()))?;

            let mut warnings = store.warnings().to_vec();
            warnings.extend(generation.warnings);

            let mut item = ResultItem::generation(generation.path, handle.hash());
            if let Ok(pointer) = serde_json::to_value(&generation.pointer) {
                item = item.with_data(pointer);
            }
            ResultSet::from_iter([item.with_warnings(warnings)])
        }

        Commands::Read { handle } => {
            let kind: DataKind = handle.kind.parse()?;
            let store = CacheStore::open(config)?;
            let handle = store.handle(&handle.id, kind);

            let item = match store.read_latest(&handle)? {
                Content::Bytes(bytes) => ResultItem::bytes(bytes, handle.hash()),
                Content::Text(text) => ResultItem::text(text, handle.hash()),
                Content::Json(value) => ResultItem::value(value, handle.hash()),
            };
            ResultSet::from_iter([item])
        }

        Commands::Pointer { handle } => {
            let kind: DataKind = handle.kind.parse()?;
            let store = CacheStore::open(config)?;
            let handle = store.handle(&handle.id, kind);

            let pointer = store.read_pointer(&handle)?;
            ResultSet::from_iter([ResultItem::pointer(&pointer, handle.hash())])
        }

        Commands::List { handle } => {
            let kind: DataKind = handle.kind.parse()?;
            let store = CacheStore::open(config)?;
            let handle = store.handle(&handle.id, kind);

            store
                .list_generations(&handle)?
                .iter()
                .map(|info| ResultItem::listed(info, handle.hash()))
                .collect()
        }

        Commands::Prune { handle, max_age } => {
            let kind: DataKind = handle.kind.parse()?;
            let store = CacheStore::open(config)?;
            let handle = store.handle(&handle.id, kind);

            store
                .prune_older_than(&handle, Duration::from_secs(max_age))?
                .into_iter()
                .map(|path| ResultItem::removed(path, handle.hash()))
                .collect()
        }

        Commands::Erase { handle } => {
            let kind: DataKind = handle.kind.parse()?;
            let store = CacheStore::open(config)?;
            let handle = store.handle(&handle.id, kind);

            store
                .erase_all(&handle)?
                .into_iter()
                .map(|path| ResultItem::removed(path, handle.hash()))
                .collect()
        }
    };

    renderer
        .write_to(&mut std::io::stdout().lock(), &result_set)
        .context("Failed to write output")
}

/// Gather write content from --value, --file, or stdin
fn load_content(kind: DataKind, value: Option<String>, file: Option<PathBuf>) -> Result<Content> {
    let content = match (value, file) {
        (Some(value), _) => Content::Text(value),
        (None, Some(path)) => Content::Bytes(
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        (None, None) => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read content from stdin")?;
            Content::Bytes(buffer)
        }
    };

    // The store takes structured_json as an in-memory value
    if kind == DataKind::StructuredJson {
        let value = match content {
            Content::Text(text) => serde_json::from_str(&text),
            Content::Bytes(bytes) => serde_json::from_slice(&bytes),
            Content::Json(value) => Ok(value),
        }
        .context("Content for structured_json must be valid JSON")?;
        return Ok(Content::Json(value));
    }

    Ok(content)
}
