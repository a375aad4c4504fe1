// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Release resolution and manifest retrieval through the GitHub REST API.
///
/// Two read-only endpoints are consumed: the release list of a repository
/// (first page only) and the contents of a file at a ref. HTTP status codes
/// are mapped onto [`ChainError`] so the pipeline can skip the affected chain.
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ChainError, Error};

/// Public GitHub REST endpoint.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Release entry as returned by `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ReleaseInfo
{
    pub tag_name:   String,
    #[serde(default)]
    pub prerelease: bool,
}

/// Envelope returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ContentEnvelope
{
    /// Base64 payload, wrapped at 60 columns by GitHub.
    #[serde(default)]
    pub content:  Option<String,>,
    #[serde(default)]
    pub encoding: Option<String,>,
    #[serde(default)]
    pub message:  Option<String,>,
}

/// Read-only view of a version-control host.
///
/// Implementations map transport and status failures onto [`ChainError`].
pub trait RepositoryHost
{
    /// Lists the first page of releases in API order.
    fn releases(
        &self,
        repository: &str,
    ) -> impl Future<Output = Result<Vec<ReleaseInfo,>, ChainError,>,> + Send;

    /// Fetches the contents envelope of `path` at `reference`.
    fn contents(
        &self,
        repository: &str,
        path: &str,
        reference: &str,
    ) -> impl Future<Output = Result<ContentEnvelope, ChainError,>,> + Send;
}

/// [`RepositoryHost`] backed by an authenticated Octocrab client.
#[derive(Debug, Clone,)]
pub struct GitHubClient
{
    octocrab: Octocrab,
}

impl GitHubClient
{
    /// Builds a client for `api_url` authenticated with `token`.
    ///
    /// Octocrab's retry layer is disabled; every non-success response is
    /// reported to the caller on the first attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] when the base URL is invalid or the client
    /// cannot be constructed.
    pub fn new(token: &str, api_url: &str, timeout: Duration,) -> Result<Self, Error,>
    {
        let octocrab = Octocrab::builder()
            .base_uri(api_url,)
            .map_err(|e| Error::client(format!("invalid GitHub API URL '{api_url}': {e}"),),)?
            .personal_token(token,)
            .add_retry_config(RetryConfig::None,)
            .set_connect_timeout(Some(timeout,),)
            .set_read_timeout(Some(timeout,),)
            .build()
            .map_err(|e| Error::client(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self {
            octocrab,
        },)
    }
}

impl RepositoryHost for GitHubClient
{
    async fn releases(&self, repository: &str,) -> Result<Vec<ReleaseInfo,>, ChainError,>
    {
        debug!("Fetching releases for {}", repository);
        self.octocrab
            .get(format!("/repos/{repository}/releases"), None::<&(),>,)
            .await
            .map_err(|e| classify(e, format!("releases from {repository}"),),)
    }

    async fn contents(
        &self,
        repository: &str,
        path: &str,
        reference: &str,
    ) -> Result<ContentEnvelope, ChainError,>
    {
        debug!("Fetching {} from {} at {}", path, repository, reference);
        self.octocrab
            .get(format!("/repos/{repository}/contents/{path}"), Some(&[("ref", reference,)],),)
            .await
            .map_err(|e| {
                classify(e, format!("file {path} in repository {repository} at ref {reference}"),)
            },)
    }
}

fn classify(error: octocrab::Error, what: String,) -> ChainError
{
    match error {
        octocrab::Error::GitHub {
            source, ..
        } => {
            let message = source.message.clone();
            ChainError::from_status(source.status_code.as_u16(), what.clone(), Some(message.clone(),),)
                .unwrap_or(ChainError::Upstream {
                    what,
                    message,
                },)
        }
        other => ChainError::Upstream {
            what,
            message: other.to_string(),
        },
    }
}

/// Returns the tag of the first release not flagged as a prerelease.
///
/// Releases are scanned in the order given, which for the GitHub API is
/// newest first.
pub fn select_stable_release(releases: &[ReleaseInfo],) -> Option<&str,>
{
    releases
        .iter()
        .find(|release| !release.prerelease,)
        .map(|release| release.tag_name.as_str(),)
}

/// Decodes a base64 file payload into UTF-8 text.
///
/// Line breaks inside the payload are ignored. Returns `None` when the
/// payload is absent, empty, not valid base64, or not UTF-8.
///
/// # Examples
///
/// ```
/// use chainver::decode_content;
///
/// let text = decode_content(Some("bW9kdWxlIGZvbwo=\n",),);
/// assert_eq!(text.as_deref(), Some("module foo\n"));
/// assert_eq!(decode_content(None,), None);
/// ```
pub fn decode_content(content: Option<&str,>,) -> Option<String,>
{
    let compact: String = content?.chars().filter(|c| !c.is_ascii_whitespace(),).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = STANDARD.decode(compact,).ok()?;
    String::from_utf8(bytes,).ok()
}

/// Resolves the newest stable release tag of `repository`.
///
/// # Errors
///
/// Propagates host failures and returns
/// [`ChainError::NoQualifyingRelease`] when every release is a prerelease or
/// the list is empty.
pub async fn resolve_latest_release<H,>(host: &H, repository: &str,) -> Result<String, ChainError,>
where
    H: RepositoryHost,
{
    let releases = host.releases(repository,).await?;
    let tag = select_stable_release(&releases,).ok_or_else(|| ChainError::NoQualifyingRelease {
        repository: repository.to_owned(),
    },)?;

    info!("Repo: {}, Latest Release Version: {}", repository, tag);
    Ok(tag.to_owned(),)
}

/// Fetches `path` from `repository` at `reference` and decodes it to text.
///
/// # Errors
///
/// Propagates host failures and returns [`ChainError::EmptyContent`] when
/// the payload is missing or unreadable.
pub async fn fetch_manifest<H,>(
    host: &H,
    repository: &str,
    path: &str,
    reference: &str,
) -> Result<String, ChainError,>
where
    H: RepositoryHost,
{
    let envelope = host.contents(repository, path, reference,).await?;
    decode_content(envelope.content.as_deref(),).ok_or_else(|| ChainError::EmptyContent {
        repository: repository.to_owned(),
        path:       path.to_owned(),
        reference:  reference.to_owned(),
    },)
}
