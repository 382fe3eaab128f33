//! Configuration loading and validation.
//!
//! The configuration file is a JSON array of dependency records:
//!
//! ```json
//! [
//!   { "repo": "acme/widget",
//!     "tag": "v1.2.0",
//!     "asset-pattern": "widget-*-linux-x86_64.tar.gz",
//!     "dest": "vendor/widget",
//!     "dir-content": true,
//!     "extract": true }
//! ]
//! ```
//!
//! `repo` and `asset-pattern` are required; everything else has a default
//! (`tag` = `"latest"`, `dest` = the repository short name, `dir-content` =
//! false, `extract` = true). Defaults are resolved by serde at load time and
//! the whole list is validated once, before assembly starts — downstream
//! code never re-checks individual fields.

use crate::core::GhrabError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Sentinel tag selecting the repository's latest published release.
pub const LATEST_TAG: &str = "latest";

/// One dependency entry from the configuration list.
///
/// Constructed by [`load_config`] (or deserialized directly in tests),
/// validated once, and read-only thereafter. Entries are independent: list
/// order determines processing order but entries carry no references to
/// each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    /// Source repository in `owner/name` form.
    pub repo: String,

    /// Release tag to resolve. `"latest"` selects the most recent published
    /// release; a value containing wildcard characters is matched against
    /// release tag names and titles.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Shell wildcard matched against release asset names.
    #[serde(rename = "asset-pattern")]
    pub asset_pattern: String,

    /// Destination path relative to the build directory. Defaults to the
    /// repository short name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    /// Collapse a single wrapping top-level directory after extraction.
    #[serde(rename = "dir-content", default)]
    pub dir_content: bool,

    /// Extract recognized archive formats. When false the asset is copied
    /// verbatim as a single file.
    #[serde(default = "default_extract")]
    pub extract: bool,
}

fn default_tag() -> String {
    LATEST_TAG.to_string()
}

const fn default_extract() -> bool {
    true
}

impl DependencySpec {
    /// The repository short name (the part after the `/`).
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.repo.rsplit('/').next().unwrap_or(&self.repo)
    }

    /// The effective destination, relative to the build directory.
    #[must_use]
    pub fn dest(&self) -> &str {
        self.dest.as_deref().unwrap_or_else(|| self.short_name())
    }

    /// Validate one entry. Called once at load time.
    pub fn validate(&self) -> Result<(), GhrabError> {
        let mut parts = self.repo.split('/');
        let owner = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        if owner.is_empty() || name.is_empty() || parts.next().is_some() {
            return Err(GhrabError::ConfigError {
                message: format!("'repo' must be 'owner/name', got '{}'", self.repo),
            });
        }

        if self.asset_pattern.is_empty() {
            return Err(GhrabError::ConfigError {
                message: format!("'asset-pattern' for '{}' must not be empty", self.repo),
            });
        }

        if let Some(dest) = &self.dest {
            let path = Path::new(dest);
            let escapes = path.is_absolute()
                || path.components().any(|c| {
                    matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir)
                });
            if dest.is_empty() || escapes {
                return Err(GhrabError::ConfigError {
                    message: format!(
                        "'dest' for '{}' must be a relative path inside the build directory, got '{dest}'",
                        self.repo
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Load and validate a configuration file.
///
/// # Errors
///
/// Returns [`GhrabError::ConfigNotFound`] when the file does not exist,
/// [`GhrabError::JsonError`] on malformed JSON, and
/// [`GhrabError::ConfigError`] when an entry fails validation.
pub fn load_config(path: &Path) -> Result<Vec<DependencySpec>> {
    if !path.exists() {
        return Err(GhrabError::ConfigNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path).map_err(GhrabError::IoError)?;
    let specs = parse_config(&content)?;
    tracing::debug!("loaded {} dependency entries from {}", specs.len(), path.display());
    Ok(specs)
}

/// Parse and validate configuration content.
pub fn parse_config(content: &str) -> Result<Vec<DependencySpec>> {
    let specs: Vec<DependencySpec> = serde_json::from_str(content).map_err(GhrabError::JsonError)?;
    for spec in &specs {
        spec.validate()?;
    }
    Ok(specs)
}
