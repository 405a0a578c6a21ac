//! Store configuration
//!
//! `StoreConfig` is the raw, caller-supplied value. `ResolvedConfig` is what
//! a store actually runs with: validated once at construction, with safe
//! fallbacks substituted (and warned about) where the raw value is unusable.

use std::fs;
use std::path::PathBuf;

use crate::core::error::{CacheError, CacheResult};
use crate::core::hash::HashAlgorithm;

/// Default permission mode for generation directories
pub const DEFAULT_DIR_MODE: u32 = 0o750;

/// How paths are reported back to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMode {
    /// Relative to the cache root, e.g. `/files/<hash>/<file>`
    Relative,
    #[default]
    Absolute,
}

impl PathMode {
    pub fn name(&self) -> &'static str {
        match self {
            PathMode::Relative => "relative",
            PathMode::Absolute => "absolute",
        }
    }
}

impl std::str::FromStr for PathMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relative" => Ok(PathMode::Relative),
            "absolute" => Ok(PathMode::Absolute),
            _ => Err(format!("invalid path mode: {}", s)),
        }
    }
}

/// Raw store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Cache root directory (created if missing)
    pub root: PathBuf,

    /// Hash algorithm name used for identifiers
    pub hash_algorithm: String,

    /// Path mode name (`relative` or `absolute`)
    pub path_mode: String,

    /// Permission mode for created directories
    pub dir_mode: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("cache"),
            hash_algorithm: HashAlgorithm::default().name().to_string(),
            path_mode: PathMode::default().name().to_string(),
            dir_mode: DEFAULT_DIR_MODE,
        }
    }
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Validate and resolve the configuration.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConfigInvalid` if the root cannot be created or
    /// resolves to something other than a directory. Every other problem is
    /// downgraded to a warning with a default substituted.
    pub fn resolve(&self) -> CacheResult<ResolvedConfig> {
        let mut warnings = Vec::new();

        let root = resolve_root(&self.root)?;

        let (algorithm, warning) = HashAlgorithm::resolve(&self.hash_algorithm);
        warnings.extend(warning);

        let path_mode = match self.path_mode.parse::<PathMode>() {
            Ok(mode) => mode,
            Err(reason) => {
                let warning = format!("{}; using absolute paths", reason);
                tracing::warn!(path_mode = %self.path_mode, "{}", warning);
                warnings.push(warning);
                PathMode::Absolute
            }
        };

        if !is_sane_dir_mode(self.dir_mode) {
            let warning = format!(
                "directory mode {:o} is outside the usual range (owner rwx, at most 777)",
                self.dir_mode
            );
            tracing::warn!(dir_mode = %format!("{:o}", self.dir_mode), "{}", warning);
            warnings.push(warning);
        }

        Ok(ResolvedConfig {
            root,
            algorithm,
            path_mode,
            dir_mode: self.dir_mode & 0o777,
            warnings,
        })
    }
}

/// Validated configuration a store runs with
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Canonical cache root
    pub root: PathBuf,
    pub algorithm: HashAlgorithm,
    pub path_mode: PathMode,
    pub dir_mode: u32,
    /// Warnings raised while resolving
    pub warnings: Vec<String>,
}

fn resolve_root(root: &std::path::Path) -> CacheResult<PathBuf> {
    if root.as_os_str().is_empty() {
        return Err(CacheError::ConfigInvalid {
            field: "root".into(),
            reason: "must not be empty".into(),
        });
    }

    if !root.exists() {
        fs::create_dir_all(root).map_err(|e| CacheError::ConfigInvalid {
            field: "root".into(),
            reason: format!("cannot create {}: {}", root.display(), e),
        })?;
    }

    let canonical = root.canonicalize().map_err(|e| CacheError::ConfigInvalid {
        field: "root".into(),
        reason: format!("cannot resolve {}: {}", root.display(), e),
    })?;

    if !canonical.is_dir() {
        return Err(CacheError::ConfigInvalid {
            field: "root".into(),
            reason: format!("{} is not a directory", canonical.display()),
        });
    }

    Ok(canonical)
}

fn is_sane_dir_mode(mode: u32) -> bool {
    mode <= 0o777 && mode & 0o700 == 0o700
}
