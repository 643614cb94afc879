//! Entry policy between the watcher and the retry controller
//!
//! For every accepted event intake waits a short settle delay (scheduled, not
//! slept), then drops empty files and repeats of the last processed path
//! before starting a retry chain.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::{
    retry::{AttemptOutcome, RetryController},
    scheduler::{Scheduler, TaskHandle},
    watcher::{FileEvent, FileEventKind},
    Result,
};

/// Pause between a notification and the first probe
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// What intake did with a settled event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Length 0 or metadata unreadable
    Empty,
    /// Same path as the last chain started
    Duplicate,
    Started(AttemptOutcome),
}

struct Inner {
    scheduler: Scheduler,
    retry: RetryController,
    attempt_open_on_create: bool,
    settle_delay: Duration,
    last_processed: Mutex<Option<PathBuf>>,
}

/// Cheap to clone; clones share the dedup marker
#[derive(Clone)]
pub struct Intake {
    inner: Arc<Inner>,
}

impl Intake {
    #[must_use]
    pub fn new(scheduler: Scheduler, retry: RetryController, attempt_open_on_create: bool) -> Self {
        Self::with_settle_delay(scheduler, retry, attempt_open_on_create, SETTLE_DELAY)
    }

    #[must_use]
    pub fn with_settle_delay(
        scheduler: Scheduler,
        retry: RetryController,
        attempt_open_on_create: bool,
        settle_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                scheduler,
                retry,
                attempt_open_on_create,
                settle_delay,
                last_processed: Mutex::new(None),
            }),
        }
    }

    /// Accept a watcher event; never blocks
    ///
    /// Returns the handle of the settle task, or `None` when the event kind is
    /// not accepted.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler has been shut down
    pub fn handle(&self, event: FileEvent) -> Result<Option<TaskHandle>> {
        if event.kind == FileEventKind::Created && !self.inner.attempt_open_on_create {
            tracing::trace!("Ignoring create event for {}", event.path.display());
            return Ok(None);
        }

        let intake = self.clone();
        let path = event.path;
        self.inner
            .scheduler
            .execute(
                move || {
                    intake.process(&path);
                    Ok(())
                },
                self.inner.settle_delay,
            )
            .map(Some)
    }

    /// Apply the zero-length and dedup checks, then start a chain
    pub fn process(&self, path: &Path) -> IntakeOutcome {
        let length = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::debug!("Dropping {}: metadata unavailable ({e})", path.display());
                return IntakeOutcome::Empty;
            }
        };
        if length == 0 {
            tracing::debug!("Dropping {}: zero length", path.display());
            return IntakeOutcome::Empty;
        }

        {
            let mut last = lock(&self.inner.last_processed);
            if last.as_deref() == Some(path) {
                tracing::debug!("Dropping {}: already processed", path.display());
                return IntakeOutcome::Duplicate;
            }
            *last = Some(path.to_path_buf());
        }

        IntakeOutcome::Started(self.inner.retry.start(path))
    }

    /// Path of the most recently started chain
    pub fn last_processed(&self) -> Option<PathBuf> {
        lock(&self.inner.last_processed).clone()
    }
}

impl fmt::Debug for Intake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intake")
            .field("attempt_open_on_create", &self.inner.attempt_open_on_create)
            .field("settle_delay", &self.inner.settle_delay)
            .field("last_processed", &self.last_processed())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
