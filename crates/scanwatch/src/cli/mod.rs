//! CLI parsing and dispatch

pub mod args;
pub mod setup;

use std::path::PathBuf;

use anyhow::Result;
use scanwatch_core::config::load_config;

use crate::commands;

/// Parse arguments, load configuration and run the selected command
pub async fn run_cli() -> Result<()> {
    let matches = args::build_cli().get_matches();

    let overrides = args::overrides(&matches);
    let explicit = matches.get_one::<PathBuf>("config");
    let config = load_config(explicit.map(PathBuf::as_path), &overrides)?;

    match matches.subcommand() {
        Some(("open-folder", _)) => commands::open_folder::run(&config),
        Some(("config", _)) => commands::config::run(&config),
        Some(("run", _)) | None => commands::run::run(config).await,
        Some((other, _)) => anyhow::bail!("Unknown command: {other}"),
    }
}

/// Render an error with its first cause when the message does not already
/// include it
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    if let Some(source) = err.source() {
        let source_msg = source.to_string();
        if !msg.contains(&source_msg) && !source_msg.is_empty() {
            return format!("{msg}\nCause: {source_msg}");
        }
    }
    msg
}
