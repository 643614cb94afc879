//! Hand a path to the OS default handler
//!
//! The child process is spawned and left alone; nothing waits for the viewer
//! to exit.

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{Error, Result};

/// Opens files and folders with whatever the desktop associates with them
pub trait Opener: Send + Sync {
    /// # Errors
    ///
    /// Returns error if the handler could not be launched
    fn open(&self, path: &Path) -> Result<()>;
}

/// [`Opener`] backed by the platform launcher
#[derive(Debug, Clone, Default)]
pub struct ShellOpener;

impl ShellOpener {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Program and leading arguments for the current platform
    fn launcher() -> Result<(PathBuf, Vec<&'static str>)> {
        if cfg!(windows) {
            // Empty string is the window title `start` would otherwise eat
            Ok((PathBuf::from("cmd"), vec!["/C", "start", ""]))
        } else if cfg!(target_os = "macos") {
            Ok((PathBuf::from("open"), Vec::new()))
        } else {
            which::which("xdg-open")
                .map(|program| (program, Vec::new()))
                .map_err(|e| Error::command_error(format!("Failed to find xdg-open in PATH: {e}")))
        }
    }
}

impl Opener for ShellOpener {
    fn open(&self, path: &Path) -> Result<()> {
        let (program, args) = Self::launcher()?;

        Command::new(&program)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|child| {
                tracing::debug!(
                    "Launched {} for {} (pid {})",
                    program.display(),
                    path.display(),
                    child.id()
                );
            })
            .map_err(|e| {
                Error::command_error(format!(
                    "Failed to open {} with {}: {e}",
                    path.display(),
                    program.display()
                ))
            })
    }
}
