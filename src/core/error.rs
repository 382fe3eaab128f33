//! Error handling for ghrab
//!
//! The error system has two layers:
//! 1. [`GhrabError`] - strongly-typed errors for every failure mode in the
//!    assembly pipeline, suitable for matching in code and for stable
//!    machine-readable reporting
//! 2. [`ErrorContext`] - a wrapper that adds user-friendly messages and
//!    actionable suggestions for CLI users
//!
//! Common standard library errors convert automatically:
//! - [`std::io::Error`] → [`GhrabError::IoError`]
//! - [`serde_json::Error`] → [`GhrabError::JsonError`]
//!
//! Use [`user_friendly_error`] to convert any error into a user-friendly
//! format with contextual suggestions before displaying it to the terminal.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ghrab::core::{GhrabError, user_friendly_error};
//!
//! fn resolve() -> Result<(), GhrabError> {
//!     Err(GhrabError::ReleaseNotFound {
//!         repo: "owner/widget".to_string(),
//!         tag: "v9.9.9".to_string(),
//!     })
//! }
//!
//! if let Err(e) = resolve() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // colored error with suggestions
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for ghrab operations
///
/// Each variant represents one failure mode of the assembly pipeline and
/// carries the context needed to report it: the repository, the tag or
/// pattern involved, and the reason where one exists.
///
/// The per-entry outcomes in an
/// [`AssemblyReport`](crate::assembler::AssemblyReport) record errors by
/// their [`kind`](GhrabError::kind) string, so variant kinds are part of the
/// machine-readable surface and must stay stable.
#[derive(Error, Debug)]
pub enum GhrabError {
    /// Repository, release, or tag absent — or inaccessible.
    ///
    /// GitHub reports a private repository that the credential cannot read
    /// as 404, identical to a repository that does not exist. Both surface
    /// here; the caller cannot always tell "absent" from "forbidden".
    #[error("No release found for '{repo}' at tag '{tag}'")]
    ReleaseNotFound {
        /// Repository in `owner/name` form
        repo: String,
        /// The tag that was requested (or `latest`)
        tag: String,
    },

    /// The supplied credential was rejected (HTTP 401/403)
    #[error("GitHub rejected the credential for '{repo}'")]
    AuthRejected {
        /// Repository in `owner/name` form
        repo: String,
    },

    /// No release asset matched the configured pattern
    #[error("No asset matching '{pattern}' in release of '{repo}'")]
    NoAssetMatch {
        /// Repository in `owner/name` form
        repo: String,
        /// The asset name pattern that matched nothing
        pattern: String,
    },

    /// More than one asset matched under the unique-match policy
    #[error("{count} assets match '{pattern}' in release of '{repo}'")]
    AmbiguousAssetMatch {
        /// Repository in `owner/name` form
        repo: String,
        /// The asset name pattern that matched more than once
        pattern: String,
        /// How many assets matched
        count: usize,
    },

    /// Network or timeout fault while talking to GitHub
    #[error("Network error during {operation}: {reason}")]
    Transport {
        /// The operation that failed (e.g. "release lookup", "asset download")
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// An archive entry would escape the destination directory
    ///
    /// Raised before anything is written: extraction validates every entry
    /// path and rejects the whole archive on the first absolute path or
    /// `..` traversal.
    #[error("Archive entry escapes the destination directory: {entry}")]
    UnsafeArchivePath {
        /// The offending entry path as stored in the archive
        entry: String,
    },

    /// Local write or permission failure
    #[error("File system error: {operation} at {path}")]
    FileSystem {
        /// The file system operation that failed
        operation: String,
        /// Path where the failure occurred
        path: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the configuration file that was not found
        path: String,
    },

    /// Configuration content is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl GhrabError {
    /// Stable machine-readable kind string, recorded in assembly reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ReleaseNotFound { .. } => "not-found",
            Self::AuthRejected { .. } => "auth",
            Self::NoAssetMatch { .. } => "no-match",
            Self::AmbiguousAssetMatch { .. } => "ambiguous-match",
            Self::Transport { .. } => "transport",
            Self::UnsafeArchivePath { .. } => "unsafe-archive",
            Self::FileSystem { .. } => "filesystem",
            Self::ConfigNotFound { .. } | Self::ConfigError { .. } => "config",
            Self::IoError(_) => "io",
            Self::JsonError(_) => "json",
            Self::Other { .. } => "other",
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`GhrabError`] and adds optional suggestions and details. When
/// displayed, errors show:
/// 1. **Error**: the main error message in red
/// 2. **Details**: additional context in yellow (optional)
/// 3. **Suggestion**: actionable steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying ghrab error
    pub error: GhrabError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`GhrabError`]
    #[must_use]
    pub const fn new(error: GhrabError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{} {}", "Details:".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{} {}", "Suggestion:".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with tailored suggestions
///
/// Downcasts to [`GhrabError`] when possible and attaches a suggestion
/// appropriate to the failure kind; other errors are wrapped as
/// [`GhrabError::Other`] with the full context chain preserved in the
/// message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    match error.downcast::<GhrabError>() {
        Ok(ghrab_error) => {
            let suggestion = suggestion_for(&ghrab_error);
            let mut ctx = ErrorContext::new(ghrab_error);
            if let Some(s) = suggestion {
                ctx = ctx.with_suggestion(s);
            }
            ctx
        }
        Err(other) => ErrorContext::new(GhrabError::Other {
            message: format!("{other:#}"),
        }),
    }
}

fn suggestion_for(error: &GhrabError) -> Option<String> {
    match error {
        GhrabError::ReleaseNotFound { repo, .. } => Some(format!(
            "Check that '{repo}' exists, has a release at the configured tag, \
             and that the token (if any) can read it; private repositories \
             report 404 when the credential lacks access"
        )),
        GhrabError::AuthRejected { .. } => {
            Some("Pass a valid token via --token or the GITHUB_TOKEN environment variable".into())
        }
        GhrabError::NoAssetMatch { repo, .. } => Some(format!(
            "List the release assets of '{repo}' and adjust 'asset-pattern' \
             in the configuration"
        )),
        GhrabError::AmbiguousAssetMatch { .. } => Some(
            "Make 'asset-pattern' more specific, or drop --unique-match to \
             accept the first match"
                .into(),
        ),
        GhrabError::Transport { .. } => {
            Some("Check network connectivity and retry; GitHub may be rate-limiting".into())
        }
        GhrabError::UnsafeArchivePath { .. } => Some(
            "The archive is malformed or malicious; contact the publisher \
             of the release"
                .into(),
        ),
        GhrabError::ConfigNotFound { .. } => {
            Some("Create a configuration file or point --config at one".into())
        }
        GhrabError::ConfigError { .. } => {
            Some("Fix the configuration entry; each record needs 'repo' and 'asset-pattern'".into())
        }
        _ => None,
    }
}
