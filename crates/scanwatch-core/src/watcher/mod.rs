//! Directory watching for new scans
//!
//! Watches one directory (non-recursively) and emits a [`FileEvent`] for every
//! create or modify notification on a file whose name matches the configured
//! wildcard filter.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use scanwatch_core::{
//!     config::WatchConfig,
//!     watcher::{FileEventKind, FileWatcher},
//! };
//!
//! # async fn example() -> scanwatch_core::Result<()> {
//! let config = WatchConfig {
//!     directory: PathBuf::from("/home/me/Scans"),
//!     filename_filter: "*.pdf".to_string(),
//! };
//!
//! let (_handle, mut rx) = FileWatcher::watch_directory(&config)?;
//!
//! while let Some(event) = rx.recv().await {
//!     if event.kind == FileEventKind::Modified {
//!         println!("{} changed", event.path.display());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ═══════════════════════════════════════════════════════════════════════════
// MODULE DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════

pub mod callbacks;
pub mod filter;
pub mod watching;

// ═══════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use callbacks::translate_event;
pub use filter::FilenameFilter;
pub use watching::{FileEvent, FileEventKind, FileWatcher, WatchHandle};
