//! Reports the dependency versions pinned by the releases of configured
//! chains.
//!
//! The library resolves the newest stable release of each configured
//! repository through the GitHub REST API, fetches a dependency manifest at
//! that release, extracts version strings for named dependencies, and renders
//! the results as a markdown or plain-text table, optionally annotated with
//! CoinGecko market capitalization. Failures are scoped to the chain that
//! produced them; the remaining chains are still reported.

mod config;
mod error;
mod extract;
mod github;
mod market;
mod pipeline;
mod render;
#[cfg(test)]
mod testing;

pub use config::{
    ChainConfig, ChainEntry, ExtractionPolicy, VersionSelector, load_config, parse_config,
};
pub use error::{ChainError, Error, io_error};
pub use extract::{CommentFilter, Extraction, TermExtractor, TermMatch};
pub use github::{
    ContentEnvelope, DEFAULT_GITHUB_API, GitHubClient, ReleaseInfo, RepositoryHost,
    decode_content, fetch_manifest, resolve_latest_release, select_stable_release,
};
pub use market::{
    CoinGeckoClient, DEFAULT_MARKET_API, MarketCap, MarketDataSource, MarketIds,
    fetch_market_cap, format_usd, market_cap_from_payload,
};
pub use pipeline::{
    ChainOutcome, ChainReport, ExtractionSettings, MarketLookup, Pipeline, processed_reports,
};
pub use render::{
    LABEL_HEADER, MARKET_CAP_HEADER, OutputFormat, Table, render_excerpts, render_report,
};
