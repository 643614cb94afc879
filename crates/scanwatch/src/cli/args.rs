//! CLI argument definitions and command builders

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scanwatch_core::ConfigOverrides;

/// Top-level `scanwatch` command with global flags and subcommands
pub fn build_cli() -> Command {
    Command::new("scanwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Open new scanner output as soon as the scanner releases it")
        .long_about(
            "Watches a scan folder. When a file appears or changes, scanwatch waits\n\
             until the writing process releases it (probing once per second, up to\n\
             --max-wait seconds) and then opens it with the default application.\n\
             \n\
             Only one instance runs per user; starting a second one notifies the\n\
             first and exits.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Read configuration from FILE (after the global config)"),
        )
        .arg(
            Arg::new("scan-dir")
                .long("scan-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Folder to watch"),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .value_name("GLOB")
                .global(true)
                .help("Only react to matching file names (e.g. \"*.pdf\")"),
        )
        .arg(
            Arg::new("max-wait")
                .long("max-wait")
                .value_name("SECS")
                .value_parser(value_parser!(u32))
                .global(true)
                .help("Give up on a locked file after this many seconds"),
        )
        .arg(
            Arg::new("open-on-create")
                .long("open-on-create")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Also react to create events, not only modifications"),
        )
        .subcommand(cmd_run())
        .subcommand(cmd_open_folder())
        .subcommand(cmd_config())
        .after_help(
            "EXAMPLES:\n  \
             # Watch ~/Scans for PDFs\n  \
             scanwatch --scan-dir ~/Scans --filter \"*.pdf\"\n\
             \n  \
             # Show the effective configuration\n  \
             scanwatch config",
        )
}

pub fn cmd_run() -> Command {
    Command::new("run").about("Run the watcher (default when no command is given)")
}

pub fn cmd_open_folder() -> Command {
    Command::new("open-folder").about("Open the scan folder with the default file manager")
}

pub fn cmd_config() -> Command {
    Command::new("config").about("Print the effective configuration as TOML")
}

/// CLI flags that override configuration; unset flags leave config alone
pub fn overrides(matches: &ArgMatches) -> ConfigOverrides {
    ConfigOverrides {
        scan_directory: matches.get_one::<PathBuf>("scan-dir").cloned(),
        filename_filter: matches.get_one::<String>("filter").cloned(),
        max_wait_seconds: matches.get_one::<u32>("max-wait").copied(),
        attempt_open_on_create: matches.get_flag("open-on-create").then_some(true),
    }
}
