// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Per-chain orchestration.
///
/// Each chain runs validate, resolve, fetch, extract and market lookup in
/// sequence. Validation, resolve and fetch failures skip the chain; extraction
/// and market lookups cannot fail. Chains are processed one at a time in configured order.
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::{
    config::{ChainConfig, ChainEntry, ExtractionPolicy, VersionSelector},
    error::ChainError,
    extract::{CommentFilter, Extraction, TermExtractor},
    github::{RepositoryHost, fetch_manifest, resolve_latest_release},
    market::{MarketCap, MarketDataSource, MarketIds, fetch_market_cap},
};

/// Result of a chain that completed every required step.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct ChainReport
{
    /// Repository identifier in `owner/name` form.
    pub repository:    String,
    /// Manifest path inside the repository.
    pub manifest_path: String,
    /// Resolved tag or the configured ref.
    pub version:       String,
    /// Search terms in configured order.
    pub search:        Vec<String,>,
    /// Market capitalization, present when lookups are enabled.
    #[serde(serialize_with = "serialize_market_cap", skip_serializing_if = "Option::is_none")]
    pub market_cap:    Option<MarketCap,>,
    /// Values pulled out of the manifest.
    pub extraction:    Extraction,
}

fn serialize_market_cap<S,>(cap: &Option<MarketCap,>, serializer: S,) -> Result<S::Ok, S::Error,>
where
    S: serde::Serializer,
{
    match cap {
        Some(cap,) => serializer.collect_str(cap,),
        None => serializer.serialize_none(),
    }
}

/// Outcome of processing one chain.
#[derive(Debug, Clone, PartialEq,)]
pub enum ChainOutcome
{
    /// Every required step succeeded.
    Processed(ChainReport,),
    /// Validation, resolve or fetch failed; the chain contributes no row.
    Skipped {
        /// Repository identifier as configured.
        repository:    String,
        /// Manifest path as configured.
        manifest_path: String,
        /// Reason the chain was skipped.
        error:         ChainError,
    },
}

impl ChainOutcome
{
    /// Returns the report of a processed chain.
    pub fn report(&self,) -> Option<&ChainReport,>
    {
        match self {
            Self::Processed(report,) => Some(report,),
            Self::Skipped {
                ..
            } => None,
        }
    }
}

/// Market lookup wiring used when the market cap column is enabled.
#[derive(Debug, Clone,)]
pub struct MarketLookup<S,>
{
    pub source: S,
    pub ids:    MarketIds,
}

/// Extraction settings shared by every chain of a run.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ExtractionSettings
{
    pub policy:   ExtractionPolicy,
    pub comments: Option<CommentFilter,>,
}

impl ExtractionSettings
{
    /// Derives the settings from the configuration document.
    pub fn from_config(config: &ChainConfig,) -> Self
    {
        let comments = if config.skip_comments {
            CommentFilter::new(&config.comment_marker,)
        } else {
            None
        };

        Self {
            policy: config.extraction,
            comments,
        }
    }
}

/// Sequential pipeline over a repository host and an optional market
/// source.
#[derive(Debug, Clone,)]
pub struct Pipeline<H, S,>
{
    host:       H,
    market:     Option<MarketLookup<S,>,>,
    extraction: ExtractionSettings,
}

impl<H, S,> Pipeline<H, S,>
where
    H: RepositoryHost,
    S: MarketDataSource,
{
    /// Wires a host, an optional market lookup and extraction settings.
    pub fn new(host: H, market: Option<MarketLookup<S,>,>, extraction: ExtractionSettings,) -> Self
    {
        Self {
            host,
            market,
            extraction,
        }
    }

    /// Processes a single chain.
    ///
    /// Failures are logged with the repository, manifest path and ref that
    /// were being fetched.
    pub async fn process_chain(&self, chain: &ChainEntry,) -> ChainOutcome
    {
        let repository = chain.repo.trim();
        let path = chain.gomod_path.trim();

        if let Err(error,) = chain.validate() {
            return skip(repository, path, &chain.release_version.to_string(), error,);
        }

        let version = match &chain.release_version {
            VersionSelector::Latest => match resolve_latest_release(&self.host, repository,).await {
                Ok(tag,) => tag,
                Err(error,) => return skip(repository, path, "latest", error,),
            },
            VersionSelector::Tag(tag,) => tag.clone(),
        };

        let content = match fetch_manifest(&self.host, repository, path, &version,).await {
            Ok(content,) => content,
            Err(error,) => return skip(repository, path, &version, error,),
        };

        let extractor = TermExtractor::new(
            self.extraction.policy,
            &chain.search,
            self.extraction.comments.clone(),
        );
        let extraction = extractor.extract(&content,);
        debug!("Extracted {:?} from {} at {}", extraction, repository, version);

        let market_cap = match &self.market {
            Some(lookup,) => Some(fetch_market_cap(&lookup.source, &lookup.ids, repository,).await,),
            None => None,
        };

        ChainOutcome::Processed(ChainReport {
            repository: repository.to_owned(),
            manifest_path: path.to_owned(),
            version,
            search: chain.search.clone(),
            market_cap,
            extraction,
        },)
    }

    /// Processes `chains` in order, advancing `progress` after each one.
    pub async fn run(&self, chains: &[ChainEntry], progress: &ProgressBar,) -> Vec<ChainOutcome,>
    {
        let mut outcomes = Vec::with_capacity(chains.len(),);
        for chain in chains {
            progress.set_message(chain.repo.clone(),);
            outcomes.push(self.process_chain(chain,).await,);
            progress.inc(1,);
        }

        let processed = outcomes.iter().filter(|outcome| outcome.report().is_some(),).count();
        progress.finish_and_clear();
        info!("Processed {} of {} chains", processed, chains.len());
        outcomes
    }
}

fn skip(repository: &str, path: &str, reference: &str, error: ChainError,) -> ChainOutcome
{
    error!("Skipping {} ({} at {}): {}", repository, path, reference, error);
    ChainOutcome::Skipped {
        repository: repository.to_owned(),
        manifest_path: path.to_owned(),
        error,
    }
}

/// Collects the reports of processed chains, preserving order.
pub fn processed_reports(outcomes: &[ChainOutcome],) -> Vec<ChainReport,>
{
    outcomes.iter().filter_map(ChainOutcome::report,).cloned().collect()
}
