//! Configuration loading from files and environment (immutable pattern)
//!
//! All operations return new instances rather than mutating shared state.

use std::path::{Path, PathBuf};

use super::types::{Config, ConfigLayer, ConfigOverrides};
use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// `explicit` is a file named on the command line; unlike the global file it
/// must exist.
///
/// # Errors
///
/// Returns error if:
/// - A config file is malformed TOML
/// - The explicit config file is missing
/// - An environment override cannot be parsed
/// - The resulting values fail validation
pub fn load_config(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    // 1. Start with built-in defaults
    let config = Config::default();

    // 2. Load global config if exists
    let config = match global_config_path() {
        Some(global_path) if global_path.exists() => {
            tracing::debug!("Loading global config from {}", global_path.display());
            config.merge(load_toml_file(&global_path)?)
        }
        _ => config,
    };

    // 3. Explicit config file
    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::invalid_config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!("Loading config from {}", path.display());
            config.merge(load_toml_file(path)?)
        }
        None => config,
    };

    // 4. Environment, 5. CLI flags
    let config = config
        .apply_env_vars()?
        .apply_overrides(overrides);

    config.validate()?;
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scanwatch")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Load a TOML file as a layer (missing keys stay unset)
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<ConfigLayer> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io_error(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::parse_error(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT AND CLI OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `SCANWATCH_*` environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the process environment in
    /// production, a map in tests)
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SCANWATCH_SCAN_DIRECTORY") {
            self.scan_directory = PathBuf::from(value);
        }

        if let Some(value) = lookup("SCANWATCH_FILENAME_FILTER") {
            self.filename_filter = value;
        }

        if let Some(value) = lookup("SCANWATCH_MAX_WAIT_SECONDS") {
            self.max_wait_seconds = value.trim().parse().map_err(|e| {
                Error::invalid_config(format!("Invalid SCANWATCH_MAX_WAIT_SECONDS value: {e}"))
            })?;
        }

        if let Some(value) = lookup("SCANWATCH_ATTEMPT_OPEN_ON_CREATE") {
            self.attempt_open_on_create = value.trim().parse().map_err(|e| {
                Error::invalid_config(format!(
                    "Invalid SCANWATCH_ATTEMPT_OPEN_ON_CREATE value: {e}"
                ))
            })?;
        }

        if let Some(value) = lookup("SCANWATCH_LOCK_DIR") {
            self.instance.lock_dir = PathBuf::from(value);
        }

        Ok(self)
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(dir) = &overrides.scan_directory {
            self.scan_directory.clone_from(dir);
        }
        if let Some(filter) = &overrides.filename_filter {
            self.filename_filter.clone_from(filter);
        }
        if let Some(secs) = overrides.max_wait_seconds {
            self.max_wait_seconds = secs;
        }
        if let Some(on_create) = overrides.attempt_open_on_create {
            self.attempt_open_on_create = on_create;
        }
        self
    }
}
