//! GitHub Releases API client.
//!
//! Covers the two network stages of the pipeline: resolving a release (by
//! explicit tag, the `"latest"` sentinel, or a wildcard tag pattern) and
//! fetching one asset's bytes. Each call performs exactly one read-only
//! request; nothing is cached or retried at this layer.
//!
//! # Authentication
//!
//! With a token, every request carries a bearer `Authorization` header and
//! asset downloads go through the asset API endpoint with
//! `Accept: application/octet-stream` — the form that works for private
//! repositories. Without a token, downloads use the asset's public
//! `browser_download_url`.
//!
//! # Error mapping
//!
//! HTTP 404 maps to [`GhrabError::ReleaseNotFound`] and 401/403 to
//! [`GhrabError::AuthRejected`]. Note that GitHub reports a private
//! repository the credential cannot read as 404, so "not found" also covers
//! "forbidden" for unauthenticated callers. Connection faults and other
//! statuses map to [`GhrabError::Transport`].

use crate::config::LATEST_TAG;
use crate::core::GhrabError;
use crate::pattern::AssetPattern;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const RELEASE_LIST_PAGE_SIZE: usize = 100;

/// Asset pattern that falls back to the auto-generated source zipball.
pub const SOURCE_ZIP: &str = "source.zip";
/// Asset pattern that falls back to the auto-generated source tarball.
pub const SOURCE_TAR_GZ: &str = "source.tar.gz";

/// A GitHub release.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Tag name (e.g. `"v1.2.0"`).
    pub tag_name: String,
    /// Release title (may be absent).
    pub name: Option<String>,
    /// Attached assets, in API listing order.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Auto-generated source zipball URL.
    pub zipball_url: Option<String>,
    /// Auto-generated source tarball URL.
    pub tarball_url: Option<String>,
}

/// A single release asset (downloadable file).
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// Asset id, used for API downloads.
    pub id: u64,
    /// File name (e.g. `"widget-1.2.0-linux-x86_64.tar.gz"`).
    pub name: String,
    /// Size in bytes as reported by the API.
    #[serde(default)]
    pub size: u64,
    /// API locator for the asset (octet-stream download endpoint).
    pub url: String,
    /// Direct public download URL.
    pub browser_download_url: String,
}

/// Result of asset selection: an uploaded asset, or the source-archive
/// fallback when the pattern names `source.zip` / `source.tar.gz` and no
/// uploaded asset matched.
#[derive(Debug, Clone)]
pub enum AssetSelection {
    /// An asset uploaded to the release.
    Uploaded(Asset),
    /// The release's auto-generated source archive.
    SourceArchive {
        /// File name the archive is treated as (`source.zip` or `source.tar.gz`).
        name: String,
        /// Download URL (zipball or tarball endpoint).
        url: String,
    },
}

impl AssetSelection {
    /// The file name the fetched bytes will carry.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Uploaded(asset) => &asset.name,
            Self::SourceArchive { name, .. } => name,
        }
    }
}

/// Asset bytes plus the originating name, handed to the archive expander.
#[derive(Debug)]
pub struct FetchedAsset {
    /// The asset's file name.
    pub name: String,
    /// Raw downloaded content.
    pub bytes: Vec<u8>,
}

/// How multiple pattern matches are resolved during asset selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// First match in listing order wins; further matches are ignored.
    #[default]
    FirstMatch,
    /// More than one match is an error.
    Unique,
}

/// GitHub API client for release resolution and asset download.
///
/// Cheap to construct; holds one [`reqwest::Client`] shared across all
/// requests of an assembly run.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
    show_progress: bool,
}

impl GithubClient {
    /// Build a client, optionally authenticated with a bearer token.
    pub fn new(token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("ghrab/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| GhrabError::Transport {
                operation: "client setup".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            token,
            show_progress: false,
        })
    }

    /// Override the API base URL (used by tests against a mock server).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Enable a progress bar during asset downloads.
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn auth_header(&self) -> Option<HeaderValue> {
        let token = self.token.as_ref()?;
        HeaderValue::from_str(&format!("Bearer {token}")).ok()
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        repo: &str,
        tag: &str,
    ) -> Result<T> {
        let mut request = self.http.get(url).header(ACCEPT, "application/vnd.github+json");
        if let Some(auth) = self.auth_header() {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(|e| GhrabError::Transport {
            operation: "release lookup".to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(release_error(repo, tag, status, &body).into());
        }

        let parsed = response.json::<T>().await.map_err(|e| GhrabError::Transport {
            operation: "release lookup".to_string(),
            reason: format!("invalid API response: {e}"),
        })?;
        Ok(parsed)
    }

    /// Resolve the release for `repo` identified by `tag`.
    ///
    /// `"latest"` queries the repository's latest published release; a tag
    /// containing wildcard characters is matched against the release list
    /// (each release's tag name, then its title); anything else is an exact
    /// tag lookup.
    pub async fn resolve_release(&self, repo: &str, tag: &str) -> Result<Release> {
        tracing::debug!("resolving release {repo}@{tag}");

        if tag == LATEST_TAG {
            let url = format!("{}/repos/{}/releases/latest", self.api_base, repo);
            return self.get_json(&url, repo, tag).await;
        }

        if AssetPattern::is_wildcard(tag) {
            return self.find_release_by_pattern(repo, tag).await;
        }

        let url = format!("{}/repos/{}/releases/tags/{}", self.api_base, repo, tag);
        self.get_json(&url, repo, tag).await
    }

    /// Search the release list for a tag name or title matching a wildcard.
    async fn find_release_by_pattern(&self, repo: &str, tag: &str) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/releases?per_page={}",
            self.api_base, repo, RELEASE_LIST_PAGE_SIZE
        );
        let releases: Vec<Release> = self.get_json(&url, repo, tag).await?;

        let pattern = AssetPattern::new(tag);
        releases
            .into_iter()
            .find(|release| {
                pattern.matches(&release.tag_name)
                    || release.name.as_deref().is_some_and(|name| pattern.matches(name))
            })
            .ok_or_else(|| {
                GhrabError::ReleaseNotFound {
                    repo: repo.to_string(),
                    tag: tag.to_string(),
                }
                .into()
            })
    }

    /// Download the selected asset's bytes.
    ///
    /// No bytes are transferred unless selection already succeeded; callers
    /// go through [`select_asset`] first.
    pub async fn download_asset(&self, repo: &str, selection: &AssetSelection) -> Result<FetchedAsset> {
        let (name, url, expected_size) = match selection {
            AssetSelection::Uploaded(asset) => {
                // The API endpoint serves private assets; the browser URL
                // only works without auth.
                if self.token.is_some() {
                    (asset.name.clone(), asset.url.clone(), asset.size)
                } else {
                    (asset.name.clone(), asset.browser_download_url.clone(), asset.size)
                }
            }
            AssetSelection::SourceArchive { name, url } => (name.clone(), url.clone(), 0),
        };

        tracing::info!("downloading {name} from {repo}");

        let mut request = self.http.get(&url).header(ACCEPT, "application/octet-stream");
        if let Some(auth) = self.auth_header() {
            request = request.header(AUTHORIZATION, auth);
        }

        let mut response = request.send().await.map_err(|e| GhrabError::Transport {
            operation: format!("download of {name}"),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GhrabError::AuthRejected { repo: repo.to_string() }.into());
        }
        if !status.is_success() {
            return Err(GhrabError::Transport {
                operation: format!("download of {name}"),
                reason: format!("HTTP {status}"),
            }
            .into());
        }

        let total = response.content_length().unwrap_or(expected_size);
        let progress = self.download_progress(&name, total);

        let mut bytes = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        while let Some(chunk) = response.chunk().await.map_err(|e| GhrabError::Transport {
            operation: format!("download of {name}"),
            reason: e.to_string(),
        })? {
            bytes.extend_from_slice(&chunk);
            progress.set_position(bytes.len() as u64);
        }
        progress.finish_and_clear();

        tracing::debug!("downloaded {name} ({} bytes)", bytes.len());
        Ok(FetchedAsset { name, bytes })
    }

    fn download_progress(&self, name: &str, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = if total > 0 {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("  {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::new_spinner()
        };
        bar.set_message(name.to_string());
        bar
    }
}

/// Select the asset matching `pattern` from a release's asset list.
///
/// Assets are tested in listing order and the first match wins. Under
/// [`MatchPolicy::Unique`] a second match fails with
/// [`GhrabError::AmbiguousAssetMatch`] instead. When nothing matches and the
/// pattern is the literal `source.zip` or `source.tar.gz`, the release's
/// auto-generated source archive is substituted.
pub fn select_asset(
    release: &Release,
    repo: &str,
    pattern: &AssetPattern,
    policy: MatchPolicy,
) -> Result<AssetSelection> {
    let mut matches = release.assets.iter().filter(|asset| pattern.matches(&asset.name));

    if let Some(first) = matches.next() {
        if policy == MatchPolicy::Unique {
            let extra = matches.count();
            if extra > 0 {
                return Err(GhrabError::AmbiguousAssetMatch {
                    repo: repo.to_string(),
                    pattern: pattern.as_str().to_string(),
                    count: extra + 1,
                }
                .into());
            }
        }
        tracing::debug!("selected asset '{}' for pattern '{}'", first.name, pattern.as_str());
        return Ok(AssetSelection::Uploaded(first.clone()));
    }

    // GitHub generates source archives for every release; honor the two
    // conventional pattern spellings as a fallback.
    let fallback = match pattern.as_str() {
        SOURCE_ZIP => release.zipball_url.as_ref().map(|url| (SOURCE_ZIP, url)),
        SOURCE_TAR_GZ => release.tarball_url.as_ref().map(|url| (SOURCE_TAR_GZ, url)),
        _ => None,
    };
    if let Some((name, url)) = fallback {
        return Ok(AssetSelection::SourceArchive {
            name: name.to_string(),
            url: url.clone(),
        });
    }

    Err(GhrabError::NoAssetMatch {
        repo: repo.to_string(),
        pattern: pattern.as_str().to_string(),
    }
    .into())
}

fn release_error(repo: &str, tag: &str, status: StatusCode, body: &str) -> GhrabError {
    match status {
        StatusCode::NOT_FOUND => GhrabError::ReleaseNotFound {
            repo: repo.to_string(),
            tag: tag.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GhrabError::AuthRejected {
            repo: repo.to_string(),
        },
        _ => GhrabError::Transport {
            operation: "release lookup".to_string(),
            reason: format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
        },
    }
}
