//! Config module - Manages snapdrift configuration (snapdrift.toml).
//!
//! Configuration file contains:
//! - Scan settings (position marker, entry order, store extension)
//! - Diff settings (worker bound, busy timeout, unwrapping)
//! - Output settings

use crate::diff::{DiffEngine, DEFAULT_BUSY_TIMEOUT, DEFAULT_MAX_PARALLEL_PAIRS};
use crate::scanner::position::{DEFAULT_MARKER, DEFAULT_SUFFIX};
use crate::scanner::{EntryOrder, PositionMarker, Scanner, DEFAULT_STORE_EXTENSION};
use crate::utils::CancellationToken;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory traversal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Entry names containing this substring set the position label
    #[serde(default = "default_marker")]
    pub marker: String,
    /// The label is the text before this suffix
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Order of entries within a directory (sorted or filesystem)
    #[serde(default)]
    pub entry_order: EntryOrder,
    /// Extension of the derived store path
    #[serde(default = "default_store_extension")]
    pub store_extension: String,
    /// Scan sibling directories in parallel
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_store_extension() -> String {
    DEFAULT_STORE_EXTENSION.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            suffix: default_suffix(),
            entry_order: EntryOrder::default(),
            store_extension: default_store_extension(),
            parallel: true,
        }
    }
}

/// Pair comparison configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Pairs compared at once; each pair holds two store handles
    #[serde(default = "default_max_parallel_pairs")]
    pub max_parallel_pairs: usize,
    /// SQLite busy timeout in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Cut the embedded database out of the wrapped file when needed
    #[serde(default = "default_true")]
    pub unwrap_embedded: bool,
}

fn default_max_parallel_pairs() -> usize {
    DEFAULT_MAX_PARALLEL_PAIRS
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT.as_millis() as u64
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_parallel_pairs: default_max_parallel_pairs(),
            busy_timeout_ms: default_busy_timeout_ms(),
            unwrap_embedded: true,
        }
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored terminal report
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Print both payloads of every mismatched row
    #[serde(default = "default_true")]
    pub show_payloads: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_payloads: true,
        }
    }
}

/// Main snapdrift configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub diff: DiffConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Get default config directory (~/.config/snapdrift/).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("snapdrift"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("snapdrift.toml")
}

impl Config {
    /// Create new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Cannot parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from default path, falling back to defaults.
    pub fn load_default() -> Result<Self> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Cannot serialize config to TOML")?;

        std::fs::write(path, content)
            .with_context(|| format!("Cannot write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn marker(&self) -> PositionMarker {
        PositionMarker::new(&self.scan.marker, &self.scan.suffix)
    }

    /// Scanner over the real filesystem configured from `[scan]`.
    pub fn scanner(&self, cancel: CancellationToken) -> Scanner {
        Scanner::new()
            .marker(self.marker())
            .entry_order(self.scan.entry_order)
            .store_extension(&self.scan.store_extension)
            .parallel(self.scan.parallel)
            .cancellation(cancel)
    }

    /// Diff engine configured from `[diff]`.
    pub fn diff_engine(&self, cancel: CancellationToken) -> DiffEngine {
        DiffEngine::new()
            .max_parallel_pairs(self.diff.max_parallel_pairs)
            .busy_timeout(Duration::from_millis(self.diff.busy_timeout_ms))
            .unwrap_embedded(self.diff.unwrap_embedded)
            .cancellation(cancel)
    }
}
