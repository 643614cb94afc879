//! ScanWatch CLI - opens new scanner output once the writer lets go of it
//!
//! Binary name: `scanwatch`

use std::process;

mod cli;
mod commands;

use cli::{format_error, run_cli};

#[tokio::main]
async fn main() {
    if let Err(e) = cli::setup::init_tracing() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Warning: {e}");
        }
    }

    if let Err(err) = run_cli().await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }

        let code = err
            .downcast_ref::<scanwatch_core::Error>()
            .map(scanwatch_core::Error::exit_code)
            .unwrap_or(1);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
