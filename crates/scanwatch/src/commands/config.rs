//! `scanwatch config`

use anyhow::{Context, Result};
use scanwatch_core::Config;

pub fn run(config: &Config) -> Result<()> {
    let rendered = render(config)?;
    #[allow(clippy::print_stdout)]
    {
        print!("{rendered}");
    }
    Ok(())
}

fn render(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration")
}
