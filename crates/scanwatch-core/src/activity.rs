//! User-visible activity log
//!
//! A bounded, timestamped record of what the daemon did ("Opening ...",
//! "Unable to open file ..."), standing in for a tray application's log
//! window. Every entry is mirrored to `tracing` so it also reaches stderr.
//!
//! The retry controller and intake only see the [`Notifier`] trait; they
//! never know where lines end up.

use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Local};

/// Sink for user-facing messages
pub trait Notifier: Send + Sync {
    /// Routine progress line
    fn info(&self, message: &str);

    /// Something went wrong but nobody needs to act
    fn warn(&self, message: &str);

    /// Failure the user should see (the daemon's equivalent of a message box)
    fn alert(&self, title: &str, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub at: DateTime<Local>,
    pub level: ActivityLevel,
    pub message: String,
}

/// Bounded in-memory activity log; clones share the same buffer
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Arc<Mutex<VecDeque<ActivityEntry>>>,
    capacity: usize,
}

impl ActivityLog {
    /// Create a log keeping at most `capacity` entries (minimum 1)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&self, level: ActivityLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            ActivityLevel::Info => tracing::info!("{message}"),
            ActivityLevel::Warn => tracing::warn!("{message}"),
            ActivityLevel::Error => tracing::error!("{message}"),
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(ActivityEntry {
            at: Local::now(),
            level,
            message,
        });
    }

    /// Snapshot of the current entries, oldest first
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any entry contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry.message.contains(needle))
    }

    /// One `HH:MM:SS [LEVEL] message` line per entry
    pub fn render(&self) -> String {
        self.entries()
            .iter()
            .map(|entry| {
                format!(
                    "{} [{}] {}",
                    entry.at.format("%H:%M:%S"),
                    entry.level,
                    entry.message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Notifier for ActivityLog {
    fn info(&self, message: &str) {
        self.push(ActivityLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(ActivityLevel::Warn, message);
    }

    fn alert(&self, title: &str, message: &str) {
        self.push(ActivityLevel::Error, format!("{title}: {message}"));
    }
}
