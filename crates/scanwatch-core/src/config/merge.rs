//! Configuration merging logic (immutable pattern)
//!
//! Later layers override earlier ones. Only keys present in a layer are
//! applied; a key set to its default value still overrides.

use super::types::{Config, ConfigLayer, InstanceConfig, InstanceLayer, LogConfig, LogLayer};

impl Config {
    /// Merge a file layer into this config (the layer takes precedence)
    #[must_use]
    pub fn merge(self, layer: ConfigLayer) -> Self {
        Self {
            scan_directory: layer.scan_directory.unwrap_or(self.scan_directory),
            filename_filter: layer.filename_filter.unwrap_or(self.filename_filter),
            max_wait_seconds: layer.max_wait_seconds.unwrap_or(self.max_wait_seconds),
            attempt_open_on_create: layer
                .attempt_open_on_create
                .unwrap_or(self.attempt_open_on_create),
            instance: self.instance.merge(layer.instance),
            log: self.log.merge(layer.log),
        }
    }
}

impl InstanceConfig {
    fn merge(self, layer: InstanceLayer) -> Self {
        Self {
            lock_dir: layer.lock_dir.unwrap_or(self.lock_dir),
            app_id: layer.app_id.unwrap_or(self.app_id),
        }
    }
}

impl LogConfig {
    fn merge(self, layer: LogLayer) -> Self {
        Self {
            capacity: layer.capacity.unwrap_or(self.capacity),
        }
    }
}
