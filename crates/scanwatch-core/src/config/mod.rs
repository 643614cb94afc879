//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/scanwatch/config.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `SCANWATCH_*`
//! 5. CLI flags
//!
//! Configuration is read once at startup; there is no live reload.
//!
//! # Example Config
//!
//! ```toml
//! scan_directory = "/home/me/Scans"
//! filename_filter = "*.pdf"
//! max_wait_seconds = 30
//! attempt_open_on_create = false
//!
//! [instance]
//! app_id = "scanwatch"
//!
//! [log]
//! capacity = 500
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files, environment and CLI overrides
//! - `merge`: Configuration merging logic
//! - `validate`: Validation

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_defaults;
#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use defaults::{DEFAULT_APP_ID, DEFAULT_FILENAME_FILTER, DEFAULT_MAX_WAIT_SECONDS};
pub use load::{global_config_path, load_config, load_toml_file};
pub use types::{
    Config, ConfigLayer, ConfigOverrides, InstanceConfig, InstanceLayer, LogConfig, LogLayer,
    WatchConfig,
};
