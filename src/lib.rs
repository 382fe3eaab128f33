//! ghrab - assemble GitHub release assets into a local build directory
//!
//! ghrab resolves a declarative list of dependencies — each naming a GitHub
//! repository, a release tag, and an asset name pattern — into concrete
//! files under a build directory. It is built for assembling third-party
//! binary artifacts (pre-built archives, single files) published as release
//! assets, including from private repositories via token authentication.
//!
//! # Pipeline
//!
//! For each configured entry, in order:
//! 1. **Resolve** the release: an explicit tag, the `"latest"` sentinel, or
//!    a wildcard pattern matched against the release list ([`github`])
//! 2. **Select** the asset whose name matches the configured shell wildcard;
//!    first match in listing order wins ([`pattern`], [`github`])
//! 3. **Fetch** the asset bytes, authenticated when a token is supplied
//! 4. **Expand** by content signature — zip and gzip+tar archives are
//!    extracted, anything else is copied verbatim ([`archive`])
//! 5. **Flatten** a single wrapping top-level directory on request
//! 6. Record the outcome in an [`assembler::AssemblyReport`]
//!
//! Entries are independent: a failure affects later entries only through
//! the error policy (abort by default, record-and-continue with
//! `ignore_errors`).
//!
//! # Configuration
//!
//! A JSON array, one record per dependency:
//!
//! ```json
//! [
//!   { "repo": "acme/widget",
//!     "tag": "v1.2.0",
//!     "asset-pattern": "widget-*-linux-x86_64.tar.gz",
//!     "dest": "vendor/widget",
//!     "dir-content": true },
//!   { "repo": "acme/icons", "asset-pattern": "icons.zip" }
//! ]
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use ghrab::assembler::{AssembleOptions, assemble};
//! use ghrab::config::load_config;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let specs = load_config(Path::new("ghrab.json"))?;
//! let mut options = AssembleOptions::new("dist");
//! options.token = std::env::var("GITHUB_TOKEN").ok();
//! options.ignore_errors = true;
//!
//! let report = assemble(&specs, &options).await?;
//! println!("{}/{} assembled", report.succeeded(), report.entries.len());
//! # Ok(())
//! # }
//! ```

// Core functionality
pub mod assembler;
pub mod cli;
pub mod config;
pub mod core;

// Network
pub mod github;

// Local processing
pub mod archive;
pub mod pattern;

// Supporting modules
pub mod utils;
