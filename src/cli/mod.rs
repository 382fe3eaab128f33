//! Command-line interface for ghrab.
//!
//! The CLI is a thin shell over [`crate::assembler::assemble`]: it loads and
//! validates the configuration file, runs the assembly, prints a per-entry
//! result line, and optionally writes the JSON summary. All real decisions
//! live in the library modules.
//!
//! # Usage
//!
//! ```bash
//! # Assemble everything from ghrab.json into ./dist
//! ghrab
//!
//! # Private repositories, custom config and output locations
//! ghrab -f deps.json -o build --token "$GITHUB_TOKEN"
//!
//! # CI pipeline: keep going on broken entries, leave a machine report
//! ghrab --ignore-errors --summary report.json
//! ```
//!
//! The token can also come from the `GITHUB_TOKEN` environment variable, and
//! `--api-url` (or `GITHUB_API_URL`, as set by GitHub Actions) points the
//! client at a GitHub Enterprise instance.

use crate::assembler::{AssembleOptions, AssemblyReport, assemble};
use crate::config::load_config;
use crate::github::MatchPolicy;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default configuration file name.
pub const DEFAULT_CONFIG: &str = "ghrab.json";
/// Default build directory.
pub const DEFAULT_BUILD_DIR: &str = "dist";
/// Default summary path when `--summary` is given without a value.
pub const DEFAULT_SUMMARY: &str = "ghrab-summary.json";

/// Assemble GitHub release assets into a local build directory.
#[derive(Parser, Debug)]
#[command(name = "ghrab", version, about)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short = 'f', long, default_value = DEFAULT_CONFIG, value_name = "FILE")]
    pub config: PathBuf,

    /// Directory dependencies are assembled into
    #[arg(short = 'o', long, default_value = DEFAULT_BUILD_DIR, value_name = "DIR")]
    pub build_dir: PathBuf,

    /// GitHub token for private repositories and API rate headroom
    #[arg(short = 't', long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Continue with the remaining entries when one fails
    #[arg(long)]
    pub ignore_errors: bool,

    /// Fail when an asset pattern matches more than one asset
    #[arg(long)]
    pub unique_match: bool,

    /// Write a JSON summary of per-entry outcomes
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SUMMARY
    )]
    pub summary: Option<PathBuf>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Enable debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable download progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Initialize tracing from the flags, honoring an explicit `RUST_LOG`.
    pub fn init_logging(&self) {
        let default_filter = if self.verbose {
            "ghrab=debug"
        } else if self.quiet {
            "ghrab=warn"
        } else {
            "ghrab=info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .init();
    }

    /// Run the assembly and report the outcome.
    pub async fn execute(self) -> Result<()> {
        let specs = load_config(&self.config)?;

        let options = AssembleOptions {
            build_dir: self.build_dir.clone(),
            token: self.token.clone(),
            ignore_errors: self.ignore_errors,
            match_policy: if self.unique_match {
                MatchPolicy::Unique
            } else {
                MatchPolicy::FirstMatch
            },
            show_progress: !self.no_progress && !self.quiet,
            api_url: self.api_url.clone(),
        };

        let report = assemble(&specs, &options).await?;

        if !self.quiet {
            print_report(&report);
        }

        if let Some(path) = &self.summary {
            report.write_summary(path)?;
        }

        if report.has_failures() {
            tracing::warn!("completed with errors (ignored due to --ignore-errors)");
        }
        Ok(())
    }
}

fn print_report(report: &AssemblyReport) {
    for entry in &report.entries {
        if entry.ok {
            println!(
                "{} {} {} -> {}",
                "ok".green().bold(),
                entry.repo,
                entry.asset.as_deref().unwrap_or("?"),
                entry.dest
            );
        } else {
            println!(
                "{} {} ({})",
                "failed".red().bold(),
                entry.repo,
                entry.error_kind.as_deref().unwrap_or("other")
            );
        }
    }
}
