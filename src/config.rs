//! Configuration document types describing the chains to inspect.
//!
//! The types in this module mirror the structure of the YAML documents
//! consumed by the CLI. Optional values fall back to the defaults used by the
//! pipeline. Entries are checked one at a time by [`ChainEntry::validate`]
//! so a malformed chain only skips itself.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{self, ChainError, Error};

/// Literal selector requesting the newest stable release.
const LATEST_SELECTOR: &str = "latest";
/// Marker that starts a comment line in Go module files.
const DEFAULT_COMMENT_MARKER: &str = "//";

/// Root configuration document describing all chains that should be
/// inspected.
///
/// # Examples
///
/// ```
/// use chainver::{ChainConfig, VersionSelector};
///
/// let yaml = r#"
/// chains:
///   - repo: cosmos/gaia
///     gomod_path: go.mod
///     release_version: latest
///     search: [github.com/cosmos/cosmos-sdk]
/// "#;
/// let config: ChainConfig = serde_yaml::from_str(yaml,).expect("valid configuration",);
/// assert_eq!(config.chains.len(), 1);
/// assert_eq!(config.chains[0].release_version, VersionSelector::Latest);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct ChainConfig
{
    /// Chains to inspect, in output order.
    #[serde(default)]
    pub chains: Vec<ChainEntry,>,

    /// Policy used to pull values out of manifest text.
    #[serde(default)]
    pub extraction: ExtractionPolicy,

    /// Drops comment lines when the line policy is active.
    #[serde(default = "default_skip_comments", alias = "skip-comments")]
    pub skip_comments: bool,

    /// Prefix identifying comment lines for [`skip_comments`](Self::skip_comments).
    #[serde(default = "default_comment_marker", alias = "comment-marker")]
    pub comment_marker: String,

    /// Repository to CoinGecko identifier overrides merged over the built-in
    /// table.
    #[serde(default, alias = "market-ids", alias = "coingecko_ids")]
    pub market_ids: BTreeMap<String, String,>,
}

/// Single configured chain: one repository, one manifest, one set of terms.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct ChainEntry
{
    /// Repository identifier in `owner/name` form.
    #[serde(alias = "repository")]
    pub repo: String,

    /// Path of the dependency manifest inside the repository.
    #[serde(alias = "manifest_path", alias = "path")]
    pub gomod_path: String,

    /// Explicit tag or the literal `latest`.
    #[serde(default, alias = "version")]
    pub release_version: VersionSelector,

    /// Search terms, in column order.
    #[serde(default)]
    pub search: Vec<String,>,
}

impl ChainEntry
{
    /// Splits the repository identifier into owner and name.
    ///
    /// Returns `None` unless the identifier has exactly two non-empty
    /// segments.
    pub fn owner_and_name(&self,) -> Option<(&str, &str,),>
    {
        let (owner, name,) = self.repo.trim().split_once('/',)?;
        if owner.is_empty() || name.is_empty() || name.contains('/',) {
            return None;
        }
        Some((owner, name,),)
    }

    /// Checks that the entry can be turned into API requests.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidEntry`] when `repo` is not in
    /// `owner/name` form, `gomod_path` is blank, or the explicit tag is empty.
    pub fn validate(&self,) -> Result<(), ChainError,>
    {
        let invalid = |message: &str| ChainError::InvalidEntry {
            repository: self.repo.trim().to_owned(),
            message:    message.to_owned(),
        };

        if self.owner_and_name().is_none() {
            return Err(invalid("repo must use the owner/name form",),);
        }
        if self.gomod_path.trim().is_empty() {
            return Err(invalid("gomod_path must not be empty",),);
        }
        if matches!(&self.release_version, VersionSelector::Tag(tag) if tag.is_empty()) {
            return Err(invalid("release_version must not be empty",),);
        }
        Ok((),)
    }
}

/// Release selector attached to every chain.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default,)]
#[serde(from = "String", into = "String")]
pub enum VersionSelector
{
    /// Resolve the first non-prerelease tag at run time.
    #[default]
    Latest,
    /// Use the given tag, branch or commit as is.
    Tag(String,),
}

impl From<String,> for VersionSelector
{
    fn from(value: String,) -> Self
    {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case(LATEST_SELECTOR,) {
            Self::Latest
        } else {
            Self::Tag(trimmed.to_owned(),)
        }
    }
}

impl From<VersionSelector,> for String
{
    fn from(value: VersionSelector,) -> Self
    {
        match value {
            VersionSelector::Latest => LATEST_SELECTOR.to_owned(),
            VersionSelector::Tag(tag,) => tag,
        }
    }
}

impl std::fmt::Display for VersionSelector
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        match self {
            Self::Latest => f.write_str(LATEST_SELECTOR,),
            Self::Tag(tag,) => f.write_str(tag,),
        }
    }
}

/// How search terms are applied to manifest text.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default,)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy
{
    /// Capture the whitespace-delimited token following each term.
    #[default]
    Token,
    /// Return whole lines matching any term.
    #[serde(alias = "line")]
    Lines,
}

fn default_skip_comments() -> bool
{
    true
}

fn default_comment_marker() -> String
{
    DEFAULT_COMMENT_MARKER.to_owned()
}

/// Loads the chain configuration from the provided YAML file path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read or the YAML cannot be
/// deserialized.
pub fn load_config(path: &Path,) -> Result<ChainConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses the chain configuration from a YAML document string.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML cannot be decoded
/// or an entry lacks a required field. Entry values are not checked here.
pub fn parse_config(contents: &str,) -> Result<ChainConfig, Error,>
{
    let config: ChainConfig = serde_yaml::from_str(contents,)?;
    Ok(config,)
}
