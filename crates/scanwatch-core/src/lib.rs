//! # ScanWatch Core
//!
//! Core functionality for ScanWatch: watch a scan folder, wait until the
//! scanner lets go of a new file, then open it.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Pipeline
//!
//! `watcher` → `intake` (settle, zero-length drop, dedup) → `retry` (probe,
//! reschedule on the `scheduler`) → `opener`. Everything user-visible goes
//! through the `activity` log.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod activity;
pub mod config;
mod error;
pub mod instance;
pub mod intake;
pub mod opener;
pub mod retry;
pub mod scheduler;
pub mod shutdown;
pub mod watcher;

pub use activity::{ActivityLog, Notifier};
pub use config::{Config, ConfigOverrides};
pub use error::{Error, Result, SystemError, ValidationError};
pub use instance::{signal_running, InstanceGuard, InstanceStatus};
pub use intake::Intake;
pub use opener::{Opener, ShellOpener};
pub use retry::{ExclusiveOpenProbe, RetryController, RetryPolicy};
pub use scheduler::{Scheduler, TaskHandle};
pub use shutdown::signal_channels;
