//! Default configuration values
//!
//! Platform directories come from the `directories` crate; when the platform
//! offers none the current directory and the temp directory are used.

use std::path::PathBuf;

use super::types::{Config, InstanceConfig, LogConfig};

/// Wildcard that matches every file name
pub const DEFAULT_FILENAME_FILTER: &str = "*.*";

/// Default retry budget in seconds
pub const DEFAULT_MAX_WAIT_SECONDS: u32 = 30;

/// Default lock identity
pub const DEFAULT_APP_ID: &str = "scanwatch";

const DEFAULT_LOG_CAPACITY: usize = 500;

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_directory: default_scan_directory(),
            filename_filter: DEFAULT_FILENAME_FILTER.to_string(),
            max_wait_seconds: DEFAULT_MAX_WAIT_SECONDS,
            attempt_open_on_create: false,
            instance: InstanceConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            lock_dir: default_lock_dir(),
            app_id: DEFAULT_APP_ID.to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PLATFORM PATHS
// ═══════════════════════════════════════════════════════════════════════════

fn default_scan_directory() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| {
            dirs.document_dir()
                .map(std::path::Path::to_path_buf)
                .or_else(|| Some(dirs.home_dir().to_path_buf()))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_lock_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", DEFAULT_APP_ID)
        .map(|dirs| {
            dirs.runtime_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .to_path_buf()
        })
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_APP_ID))
}
