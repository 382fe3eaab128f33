//! ghrab CLI entry point
//!
//! Parses arguments, runs the assembly, and translates failures into a
//! user-friendly error display and a non-zero exit code.

use anyhow::Result;
use clap::Parser;
use ghrab::cli::Cli;
use ghrab::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
