//! `scanwatch open-folder`

use anyhow::Result;
use scanwatch_core::{Config, Error, Opener, ShellOpener};

pub fn run(config: &Config) -> Result<()> {
    open_with(&ShellOpener::new(), config)
}

fn open_with(opener: &dyn Opener, config: &Config) -> Result<()> {
    let dir = &config.scan_directory;
    if !dir.is_dir() {
        return Err(Error::io_error(format!("Scan folder does not exist: {}", dir.display())).into());
    }

    tracing::info!("Opening {}...", dir.display());
    opener.open(dir)?;
    Ok(())
}
