//! Configuration type definitions
//!
//! Pure data holders with derived traits; behavior lives in the sibling
//! modules.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// MAIN CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

/// Root configuration structure
///
/// Loaded from defaults → global → explicit file → env vars → CLI flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory being watched for new files
    pub scan_directory: PathBuf,
    /// Wildcard pattern (`*`, `?`) limiting which files trigger a chain
    pub filename_filter: String,
    /// Retry budget: one probe per second for this many seconds
    pub max_wait_seconds: u32,
    /// Whether create events (not only modify events) start a chain
    pub attempt_open_on_create: bool,
    pub instance: InstanceConfig,
    pub log: LogConfig,
}

// ═══════════════════════════════════════════════════════════════════════════
// NESTED CONFIGURATION STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstanceConfig {
    /// Directory holding the instance lock and wake files
    pub lock_dir: PathBuf,
    /// Identity used to name the lock; one running instance per identity
    pub app_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Number of activity entries kept in memory
    pub capacity: usize,
}

// ═══════════════════════════════════════════════════════════════════════════
// FILE LAYERS
// ═══════════════════════════════════════════════════════════════════════════

/// One config file as written: a key that is absent stays `None`, so a layer
/// can set a value back to its default
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigLayer {
    pub scan_directory: Option<PathBuf>,
    pub filename_filter: Option<String>,
    pub max_wait_seconds: Option<u32>,
    pub attempt_open_on_create: Option<bool>,
    pub instance: InstanceLayer,
    pub log: LogLayer,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstanceLayer {
    pub lock_dir: Option<PathBuf>,
    pub app_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogLayer {
    pub capacity: Option<usize>,
}

// ═══════════════════════════════════════════════════════════════════════════
// DERIVED / TRANSIENT
// ═══════════════════════════════════════════════════════════════════════════

/// The subset of configuration the directory watcher needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub directory: PathBuf,
    pub filename_filter: String,
}

/// Command-line overrides, applied last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub scan_directory: Option<PathBuf>,
    pub filename_filter: Option<String>,
    pub max_wait_seconds: Option<u32>,
    pub attempt_open_on_create: Option<bool>,
}

impl Config {
    /// Watcher settings derived from this configuration
    #[must_use]
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            directory: self.scan_directory.clone(),
            filename_filter: self.filename_filter.clone(),
        }
    }
}
