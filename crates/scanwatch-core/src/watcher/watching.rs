//! Directory watching via `notify`
//!
//! Callbacks run on `notify`'s own thread and forward into a bounded Tokio
//! channel with `blocking_send`.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::{callbacks::translate_event, filter::FilenameFilter};
use crate::{config::WatchConfig, Error, Result};

/// Capacity of the watcher → daemon channel
const EVENT_CHANNEL_CAPACITY: usize = 100;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    Created,
    Modified,
}

/// A file in the watched directory was created or changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileEventKind,
}

impl FileEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: FileEventKind::Created,
        }
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: FileEventKind::Modified,
        }
    }
}

/// Keeps the underlying watcher alive; watching stops when dropped
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    directory: PathBuf,
    filter: FilenameFilter,
}

impl WatchHandle {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub const fn filter(&self) -> &FilenameFilter {
        &self.filter
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("directory", &self.directory)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Directory watcher for scan output
pub struct FileWatcher;

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl FileWatcher {
    /// Watch `config.directory` (non-recursive) for files matching the filter
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The filter pattern is invalid
    /// - The directory does not exist or is not a directory
    /// - The platform watcher cannot be created or attached
    pub fn watch_directory(
        config: &WatchConfig,
    ) -> Result<(WatchHandle, mpsc::Receiver<FileEvent>)> {
        let filter = FilenameFilter::new(&config.filename_filter)?;

        if !config.directory.exists() {
            return Err(Error::watch_error(format!(
                "Scan directory does not exist: {}",
                config.directory.display()
            )));
        }
        if !config.directory.is_dir() {
            return Err(Error::watch_error(format!(
                "Scan directory is not a directory: {}",
                config.directory.display()
            )));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let callback_filter = filter.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => translate_event(&event, &callback_filter)
                    .into_iter()
                    .for_each(|file_event| {
                        if tx.blocking_send(file_event).is_err() {
                            tracing::trace!("Event receiver dropped");
                        }
                    }),
                Err(e) => tracing::warn!("Watch error: {e}"),
            }
        })
        .map_err(|e| Error::watch_error(format!("Failed to create file watcher: {e}")))?;

        watcher
            .watch(&config.directory, RecursiveMode::NonRecursive)
            .map_err(|e| {
                Error::watch_error(format!(
                    "Failed to watch {}: {e}",
                    config.directory.display()
                ))
            })?;

        tracing::info!(
            "Watching {} for {}",
            config.directory.display(),
            filter.pattern()
        );

        Ok((
            WatchHandle {
                _watcher: watcher,
                directory: config.directory.clone(),
                filter,
            },
            rx,
        ))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
