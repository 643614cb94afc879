//! Single-instance guard
//!
//! One daemon per user session and application identity. The guard is a lock
//! file holding the owner's PID, locked with `fs2`. On drop the PID is cleared
//! and the lock released; the file itself stays, so every launch contends on
//! the same inode.
//! A second launch does not start; it pokes the running instance by touching
//! a wake file that the primary watches.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use scanwatch_core::instance::{signal_running, InstanceGuard, InstanceStatus};
//!
//! let lock_dir = Path::new("/run/user/1000/scanwatch");
//! match InstanceGuard::acquire(lock_dir, "scanwatch")? {
//!     InstanceStatus::Primary(guard) => {
//!         // Run the daemon; the lock is released when `guard` drops
//!         drop(guard);
//!     }
//!     InstanceStatus::AlreadyRunning { holder_pid } => {
//!         println!("Already running (PID: {holder_pid:?})");
//!         signal_running(lock_dir, "scanwatch")?;
//!     }
//! }
//! # Ok::<(), scanwatch_core::Error>(())
//! ```

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use fs2::FileExt;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::{watcher::callbacks::classify_kind, Error, Result};

/// Queued wake requests beyond this are coalesced
const WAKE_CHANNEL_CAPACITY: usize = 8;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Held by the primary instance; releases the lock when dropped
pub struct InstanceGuard {
    lock_file: PathBuf,
    wake_file: PathBuf,
    lock_fd: File,
}

/// Result of trying to become the running instance
#[derive(Debug)]
pub enum InstanceStatus {
    Primary(InstanceGuard),
    /// PID is `None` when the lock file could not be read
    AlreadyRunning { holder_pid: Option<u32> },
}

/// Keeps the wake-file watcher alive
pub struct WakeWatcher {
    _watcher: RecommendedWatcher,
}

impl fmt::Debug for WakeWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakeWatcher").finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl InstanceGuard {
    /// Try to become the one running instance for `app_id`
    ///
    /// # Errors
    ///
    /// Returns error if the lock directory or file cannot be created, or
    /// locking fails for a reason other than contention
    pub fn acquire(lock_dir: &Path, app_id: &str) -> Result<InstanceStatus> {
        fs::create_dir_all(lock_dir).map_err(|e| {
            Error::instance_lock(format!(
                "Failed to create lock directory {}: {e}",
                lock_dir.display()
            ))
        })?;

        let lock_file = lock_path(lock_dir, app_id);
        // No truncate: the current holder's PID must survive a failed attempt
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file)
            .map_err(|e| {
                Error::instance_lock(format!(
                    "Failed to open lock file {}: {e}",
                    lock_file.display()
                ))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                write_pid(&mut file).map_err(|e| {
                    Error::instance_lock(format!("Failed to write PID to lock file: {e}"))
                })?;
                tracing::debug!("Acquired instance lock {}", lock_file.display());

                Ok(InstanceStatus::Primary(Self {
                    lock_file,
                    wake_file: wake_path(lock_dir, app_id),
                    lock_fd: file,
                }))
            }
            Err(e) if is_contended(&e) => {
                let holder_pid = read_pid(&lock_file);
                tracing::debug!("Instance lock held by {holder_pid:?}");
                Ok(InstanceStatus::AlreadyRunning { holder_pid })
            }
            Err(e) => Err(Error::instance_lock(format!(
                "Failed to lock {}: {e}",
                lock_file.display()
            ))),
        }
    }

    pub fn lock_file(&self) -> &Path {
        &self.lock_file
    }

    pub fn wake_file(&self) -> &Path {
        &self.wake_file
    }

    /// Watch for [`signal_running`] from later launches
    ///
    /// # Errors
    ///
    /// Returns error if the lock directory cannot be watched
    pub fn wake_requests(&self) -> Result<(WakeWatcher, mpsc::Receiver<()>)> {
        let (tx, rx) = mpsc::channel(WAKE_CHANNEL_CAPACITY);
        let wake_name = self.wake_file.file_name().map(ToOwned::to_owned);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else {
                return;
            };
            let is_wake = classify_kind(&event.kind).is_some()
                && event
                    .paths
                    .iter()
                    .any(|path| path.file_name() == wake_name.as_deref());
            if is_wake {
                // Full channel means a wake is already queued
                let _ = tx.try_send(());
            }
        })
        .map_err(|e| Error::watch_error(format!("Failed to create wake watcher: {e}")))?;

        let dir = self
            .wake_file
            .parent()
            .ok_or_else(|| Error::instance_lock("Wake file has no parent directory"))?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| Error::watch_error(format!("Failed to watch {}: {e}", dir.display())))?;

        Ok((WakeWatcher { _watcher: watcher }, rx))
    }
}

/// Best-effort nudge to the running instance
///
/// # Errors
///
/// Returns error if the wake file cannot be written
pub fn signal_running(lock_dir: &Path, app_id: &str) -> Result<()> {
    let wake_file = wake_path(lock_dir, app_id);
    fs::write(&wake_file, Local::now().to_rfc3339()).map_err(|e| {
        Error::instance_lock(format!(
            "Failed to signal running instance via {}: {e}",
            wake_file.display()
        ))
    })
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        // Best-effort cleanup - don't panic in Drop
        if let Err(e) = self.lock_fd.set_len(0) {
            tracing::warn!(
                "Failed to clear lock file {}: {e}",
                self.lock_file.display()
            );
        }
        let _ = fs::remove_file(&self.wake_file);
    }
}

impl fmt::Debug for InstanceGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceGuard")
            .field("lock_file", &self.lock_file)
            .field("wake_file", &self.wake_file)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

fn lock_path(lock_dir: &Path, app_id: &str) -> PathBuf {
    lock_dir.join(format!("{app_id}.lock"))
}

fn wake_path(lock_dir: &Path, app_id: &str) -> PathBuf {
    lock_dir.join(format!("{app_id}.wake"))
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn write_pid(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(std::process::id().to_string().as_bytes())?;
    file.flush()
}

fn read_pid(lock_file: &Path) -> Option<u32> {
    let mut content = String::new();
    File::open(lock_file)
        .and_then(|mut file| file.read_to_string(&mut content))
        .ok()?;
    parse_pid(&content)
}

fn parse_pid(content: &str) -> Option<u32> {
    content.trim().parse::<u32>().ok()
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
