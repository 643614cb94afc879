//! Subcommand implementations

pub mod config;
pub mod open_folder;
pub mod run;
