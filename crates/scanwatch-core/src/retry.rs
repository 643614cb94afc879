//! File-availability retry controller
//!
//! A freshly written scan is often still held open by the scanner driver.
//! The controller probes the file; while it is locked and budget remains it
//! arms a one-second retry on the [`Scheduler`], and once the lock is gone it
//! hands the file to the [`Opener`].
//!
//! ```text
//! PENDING_CHECK ──Available──▶ OPENED
//!      │  ▲
//!   Locked│  │ retry interval
//!      ▼  │
//!   WAITING (remaining > 0)
//!      │
//!      └──Locked, remaining == 0──▶ GAVE_UP
//!
//! PENDING_CHECK ──Failed(kind)──▶ FAILED
//! ```
//!
//! Waiting never blocks a thread: it is one task armed in the scheduler. A
//! new chain for a path cancels the older chain's pending retry.

use std::{
    collections::HashMap,
    fmt,
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use fs2::FileExt;

use crate::{
    activity::Notifier,
    opener::Opener,
    scheduler::{Scheduler, TaskHandle},
};

/// Pause between two probes of the same file
pub const RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Windows `ERROR_SHARING_VIOLATION` / `ERROR_LOCK_VIOLATION`
#[cfg(windows)]
const WINDOWS_SHARING_ERRORS: [i32; 2] = [32, 33];

// ═══════════════════════════════════════════════════════════════════════════
// PROBE
// ═══════════════════════════════════════════════════════════════════════════

/// Result of checking whether another process still holds a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Available,
    Locked,
    /// The file cannot be checked at all; retrying will not help
    Failed(io::ErrorKind),
}

/// Detects whether a file is held by another process
pub trait LockProbe: Send + Sync {
    fn probe(&self, path: &Path) -> ProbeOutcome;
}

/// Opens the file exclusively and takes a non-blocking `fs2` lock
///
/// On Windows the open itself uses share mode none, which is what fails while
/// a scanner driver is still writing. Elsewhere the advisory lock catches
/// writers that lock their output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExclusiveOpenProbe;

impl ExclusiveOpenProbe {
    fn open(path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.read(true);
        #[cfg(windows)]
        {
            use std::os::windows::fs::OpenOptionsExt;
            options.share_mode(0);
        }
        options.open(path)
    }
}

impl LockProbe for ExclusiveOpenProbe {
    fn probe(&self, path: &Path) -> ProbeOutcome {
        let file = match Self::open(path) {
            Ok(file) => file,
            Err(e) => return classify(&e),
        };

        // The lock goes away with `file`
        match file.try_lock_exclusive() {
            Ok(()) => ProbeOutcome::Available,
            Err(e) => classify(&e),
        }
    }
}

/// Sort an open/lock error into "someone else has it" or "give up"
///
/// `PermissionDenied` counts as contention: Windows reports a file opened
/// for delete-on-close by the writer that way.
fn classify(error: &io::Error) -> ProbeOutcome {
    let would_block = error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error();
    let denied = error.kind() == io::ErrorKind::PermissionDenied;

    if would_block || denied || is_sharing_violation(error) {
        ProbeOutcome::Locked
    } else {
        ProbeOutcome::Failed(error.kind())
    }
}

#[cfg(windows)]
fn is_sharing_violation(error: &io::Error) -> bool {
    error
        .raw_os_error()
        .is_some_and(|code| WINDOWS_SHARING_ERRORS.contains(&code))
}

#[cfg(not(windows))]
const fn is_sharing_violation(_error: &io::Error) -> bool {
    false
}

// ═══════════════════════════════════════════════════════════════════════════
// CONTROLLER
// ═══════════════════════════════════════════════════════════════════════════

/// How often and how long to keep probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first probe; a chain probes at most `max_attempts + 1` times
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    /// One retry per second for `seconds` seconds
    #[must_use]
    pub const fn from_max_wait(seconds: u32) -> Self {
        Self {
            max_attempts: seconds,
            interval: RETRY_INTERVAL,
        }
    }
}

/// What a single step of a chain did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// File was free and handed to the opener (even if the opener then failed)
    Opened,
    /// Still locked; a retry with `remaining` attempts left is armed
    Rescheduled { remaining: u32 },
    /// Still locked with no budget left
    GaveUp,
    /// Probe error or the retry could not be scheduled
    Failed,
}

struct Inner {
    scheduler: Scheduler,
    probe: Arc<dyn LockProbe>,
    opener: Arc<dyn Opener>,
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
    pending: Mutex<HashMap<PathBuf, TaskHandle>>,
}

/// Drives retry chains; clones share the pending map
#[derive(Clone)]
pub struct RetryController {
    inner: Arc<Inner>,
}

impl RetryController {
    #[must_use]
    pub fn new(
        scheduler: Scheduler,
        probe: Arc<dyn LockProbe>,
        opener: Arc<dyn Opener>,
        notifier: Arc<dyn Notifier>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                scheduler,
                probe,
                opener,
                notifier,
                policy,
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.inner.policy
    }

    /// Begin a chain for `path` with the full budget
    ///
    /// A retry still pending for the same path is cancelled first. Chains are
    /// expected to be started from scheduler actions (as intake does), which
    /// never overlap with a firing retry.
    pub fn start(&self, path: impl Into<PathBuf>) -> AttemptOutcome {
        let path = path.into();
        let previous = lock(&self.inner.pending).remove(&path);
        if let Some(previous) = previous {
            if self.inner.scheduler.cancel(&previous) {
                tracing::debug!("Superseded pending retry for {}", path.display());
            }
        }
        self.attempt(&path, self.inner.policy.max_attempts)
    }

    /// Probe once and act on the result
    pub fn attempt(&self, path: &Path, remaining: u32) -> AttemptOutcome {
        let notifier = &self.inner.notifier;

        match self.inner.probe.probe(path) {
            ProbeOutcome::Available => {
                self.finish(path);
                notifier.info(&format!("Opening {}...", path.display()));
                if let Err(e) = self.inner.opener.open(path) {
                    notifier.alert("Error", &e.to_string());
                }
                AttemptOutcome::Opened
            }
            ProbeOutcome::Locked if remaining == 0 => {
                self.finish(path);
                notifier.warn(&format!(
                    "Unable to open file; the file was still locked after {} seconds.",
                    self.inner.policy.max_attempts
                ));
                AttemptOutcome::GaveUp
            }
            ProbeOutcome::Locked => self.reschedule(path, remaining - 1),
            ProbeOutcome::Failed(kind) => {
                self.finish(path);
                tracing::warn!("Probe of {} failed: {kind}", path.display());
                notifier.warn(&format!("Unable to open {}: {kind}", path.display()));
                AttemptOutcome::Failed
            }
        }
    }

    /// Paths with a retry currently armed
    pub fn pending_count(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    pub fn is_waiting(&self, path: &Path) -> bool {
        lock(&self.inner.pending).contains_key(path)
    }

    fn reschedule(&self, path: &Path, remaining: u32) -> AttemptOutcome {
        let controller = self.clone();
        let owned = path.to_path_buf();

        // Held across execute so the retry cannot fire and finish before its
        // handle is recorded
        let mut pending = lock(&self.inner.pending);
        let scheduled = self.inner.scheduler.execute(
            move || {
                controller.attempt(&owned, remaining);
                Ok(())
            },
            self.inner.policy.interval,
        );

        match scheduled {
            Ok(handle) => {
                pending.insert(path.to_path_buf(), handle);
                tracing::debug!(
                    "{} is locked, retrying ({remaining} attempt(s) left)",
                    path.display()
                );
                AttemptOutcome::Rescheduled { remaining }
            }
            Err(e) => {
                pending.remove(path);
                tracing::warn!("Cannot schedule retry for {}: {e}", path.display());
                AttemptOutcome::Failed
            }
        }
    }

    fn finish(&self, path: &Path) {
        lock(&self.inner.pending).remove(path);
    }
}

impl fmt::Debug for RetryController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryController")
            .field("policy", &self.inner.policy)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
