//! Assembly orchestration.
//!
//! [`assemble`] walks the configured dependency list in order and, for each
//! entry: resolves the release, selects and downloads the matching asset,
//! expands (or copies) it into `build_dir / dest`, and optionally flattens a
//! single wrapping directory. Entries are processed strictly sequentially
//! and share no state beyond the build directory root.
//!
//! Failures are caught at the per-entry boundary. With
//! [`AssembleOptions::ignore_errors`] set, a failed entry is recorded in the
//! report and processing continues; otherwise the first failure aborts the
//! run, leaving earlier completions in place and later entries untouched.
//!
//! The resulting [`AssemblyReport`] records, per entry, the resolved tag and
//! asset name when known and either success or a stable error kind. It
//! serializes to JSON for pipeline consumption.

use crate::archive;
use crate::config::DependencySpec;
use crate::core::GhrabError;
use crate::github::{GithubClient, MatchPolicy, select_asset};
use crate::pattern::AssetPattern;
use crate::utils;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options controlling one assembly run.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Root directory all destinations are resolved under.
    pub build_dir: PathBuf,
    /// Bearer token for private repositories and API rate headroom.
    pub token: Option<String>,
    /// Record failures and continue instead of aborting on the first one.
    pub ignore_errors: bool,
    /// How multiple asset matches are resolved.
    pub match_policy: MatchPolicy,
    /// Show download progress bars.
    pub show_progress: bool,
    /// Override the GitHub API base URL (GitHub Enterprise, tests).
    pub api_url: Option<String>,
}

impl AssembleOptions {
    /// Options with defaults for the given build directory.
    #[must_use]
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
            token: None,
            ignore_errors: false,
            match_policy: MatchPolicy::FirstMatch,
            show_progress: false,
            api_url: None,
        }
    }
}

/// Outcome of one assembly run, entry per configured dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Per-dependency outcomes, in configuration order.
    pub entries: Vec<EntryReport>,
}

impl AssemblyReport {
    /// Whether any entry failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|entry| !entry.ok)
    }

    /// Number of successfully assembled entries.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|entry| entry.ok).count()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_summary(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                utils::ensure_dir(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(GhrabError::JsonError)?;
        std::fs::write(path, json).map_err(GhrabError::IoError)?;
        tracing::info!("summary written to {}", path.display());
        Ok(())
    }
}

/// Outcome of one dependency entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntryReport {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Destination path relative to the build directory.
    pub dest: String,
    /// Resolved release tag, when resolution got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Selected asset name, when selection got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    /// Whether the entry was fully assembled.
    pub ok: bool,
    /// Stable failure kind (see `GhrabError::kind`) when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Human-readable failure description when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryReport {
    fn success(spec: &DependencySpec, tag: String, asset: String) -> Self {
        Self {
            repo: spec.repo.clone(),
            dest: spec.dest().to_string(),
            tag: Some(tag),
            asset: Some(asset),
            ok: true,
            error_kind: None,
            error: None,
        }
    }

    fn failure(spec: &DependencySpec, error: &anyhow::Error) -> Self {
        let kind = error
            .downcast_ref::<GhrabError>()
            .map_or("other", GhrabError::kind);
        Self {
            repo: spec.repo.clone(),
            dest: spec.dest().to_string(),
            tag: None,
            asset: None,
            ok: false,
            error_kind: Some(kind.to_string()),
            error: Some(format!("{error:#}")),
        }
    }
}

/// Assemble every configured dependency into the build directory.
///
/// This is the single entry point exposed to both the CLI and library
/// callers. The configuration is expected to be validated already (see
/// [`crate::config::load_config`]).
///
/// # Errors
///
/// With `ignore_errors` unset, the first per-entry failure propagates and no
/// further entries are attempted. Failures to create the build directory
/// itself always propagate.
pub async fn assemble(
    specs: &[DependencySpec],
    options: &AssembleOptions,
) -> Result<AssemblyReport> {
    utils::ensure_dir(&options.build_dir)?;

    let mut client =
        GithubClient::new(options.token.clone())?.with_progress(options.show_progress);
    if let Some(base) = &options.api_url {
        client = client.with_api_base(base.clone());
    }

    let mut entries = Vec::with_capacity(specs.len());
    for spec in specs {
        tracing::info!("processing {} ({})", spec.repo, spec.tag);
        match process_spec(&client, spec, options).await {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                if !options.ignore_errors {
                    return Err(error.context(format!("failed to assemble '{}'", spec.repo)));
                }
                tracing::warn!("skipping '{}': {error:#}", spec.repo);
                entries.push(EntryReport::failure(spec, &error));
            }
        }
    }

    let report = AssemblyReport { entries };
    tracing::info!(
        "assembled {}/{} dependencies into {}",
        report.succeeded(),
        report.entries.len(),
        options.build_dir.display()
    );
    Ok(report)
}

async fn process_spec(
    client: &GithubClient,
    spec: &DependencySpec,
    options: &AssembleOptions,
) -> Result<EntryReport> {
    let release = client.resolve_release(&spec.repo, &spec.tag).await?;

    let pattern = AssetPattern::new(&spec.asset_pattern);
    let selection = select_asset(&release, &spec.repo, &pattern, options.match_policy)?;
    let fetched = client.download_asset(&spec.repo, &selection).await?;

    let dest_dir = options.build_dir.join(spec.dest());
    archive::expand(&fetched.bytes, &fetched.name, &dest_dir, spec.extract)
        .with_context(|| format!("expanding '{}' into {}", fetched.name, dest_dir.display()))?;

    if spec.dir_content {
        archive::flatten_single_dir(&dest_dir)?;
    }

    Ok(EntryReport::success(spec, release.tag_name, fetched.name))
}
