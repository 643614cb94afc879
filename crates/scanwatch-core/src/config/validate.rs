//! Configuration validation

use super::types::Config;
use crate::{Error, Result};

/// Upper bound for the retry budget (one hour of polling)
const MAX_WAIT_SECONDS_LIMIT: u32 = 3600;

/// Upper bound for the in-memory activity log
const MAX_LOG_CAPACITY: usize = 100_000;

impl Config {
    /// Validate configuration values
    ///
    /// The scan directory is not checked here; the watcher reports a missing
    /// directory when it attaches.
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        if self.filename_filter.trim().is_empty() {
            return Err(Error::invalid_config(
                "filename_filter cannot be empty - use \"*.*\" to match every file",
            ));
        }

        if self.max_wait_seconds > MAX_WAIT_SECONDS_LIMIT {
            return Err(Error::invalid_config(format!(
                "max_wait_seconds must be 0-{MAX_WAIT_SECONDS_LIMIT}, got {}",
                self.max_wait_seconds
            )));
        }

        if self.log.capacity == 0 || self.log.capacity > MAX_LOG_CAPACITY {
            return Err(Error::invalid_config(format!(
                "log.capacity must be 1-{MAX_LOG_CAPACITY}, got {}",
                self.log.capacity
            )));
        }

        let app_id = self.instance.app_id.trim();
        if app_id.is_empty() {
            return Err(Error::invalid_config("instance.app_id cannot be empty"));
        }
        if app_id.contains(['/', '\\']) {
            return Err(Error::invalid_config(format!(
                "instance.app_id cannot contain path separators: {app_id}"
            )));
        }

        Ok(())
    }
}
