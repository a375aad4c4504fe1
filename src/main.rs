//! Command-line interface for the chainver binary.
//!
//! The CLI loads the chain configuration, checks the GitHub credential,
//! processes every chain in order and prints a single report to stdout.
//! Logs go to stderr.

use std::{path::PathBuf, process, time::Duration};

use chainver::{
    ChainConfig, CoinGeckoClient, DEFAULT_GITHUB_API, DEFAULT_MARKET_API, Error,
    ExtractionSettings, GitHubClient, MarketIds, MarketLookup, OutputFormat, Pipeline,
    load_config, processed_reports, render_report,
};
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command line interface for reporting dependency versions across chains.
#[derive(Debug, Parser,)]
#[command(
    name = "chainver",
    version,
    about = "Report dependency versions pinned by the latest release of each chain"
)]
struct Cli
{
    /// Path to the YAML configuration file listing chains.
    #[arg(long = "config", value_name = "PATH", default_value = "config.yaml")]
    config: PathBuf,

    /// Output layout for the report.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Add a market capitalization column sourced from CoinGecko.
    #[arg(long = "market-cap", action = ArgAction::SetTrue)]
    market_cap: bool,

    /// GitHub token used for API authentication.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Base URL of the GitHub REST API.
    #[arg(long = "github-api", value_name = "URL", default_value = DEFAULT_GITHUB_API)]
    github_api: String,

    /// Base URL of the CoinGecko API.
    #[arg(long = "market-api", value_name = "URL", default_value = DEFAULT_MARKET_API)]
    market_api: String,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Enable debug logging.
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    debug: bool,
}

/// Entry point that reports fatal errors and sets the exit status.
#[tokio::main]
async fn main()
{
    let cli = Cli::parse();
    init_tracing(cli.debug,);

    if let Err(error,) = run(cli,).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Installs the stderr log subscriber.
///
/// `--debug` wins over `RUST_LOG`, which wins over the `info` default.
fn init_tracing(debug: bool,)
{
    let filter = if debug {
        EnvFilter::new("chainver=debug",)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chainver=info",),)
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false,).with_writer(std::io::stderr,),)
        .with(filter,)
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Returns fatal errors only: missing credential, unreadable configuration,
/// or client construction failures. Chain failures are logged and skipped.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let token = require_token(cli.token.as_deref(),)?;
    let config = load_config(&cli.config,)?;
    debug!("Loaded {} chains from {}", config.chains.len(), cli.config.display());

    let timeout = Duration::from_secs(cli.timeout,);
    let host = GitHubClient::new(token, &cli.github_api, timeout,)?;
    let market = if cli.market_cap {
        Some(market_lookup(&config, &cli.market_api, timeout,)?,)
    } else {
        None
    };

    let pipeline = Pipeline::new(host, market, ExtractionSettings::from_config(&config,),);
    let progress = progress_bar(config.chains.len(),);
    let outcomes = pipeline.run(&config.chains, &progress,).await;

    let reports = processed_reports(&outcomes,);
    let output = render_report(&reports, config.extraction, cli.format, cli.market_cap,)?;
    print!("{output}");

    Ok((),)
}

/// Returns the trimmed token or the fatal missing-credential error.
fn require_token(token: Option<&str,>,) -> Result<&str, Error,>
{
    token
        .map(str::trim,)
        .filter(|value| !value.is_empty(),)
        .ok_or_else(|| Error::validation("missing GitHub token: set GITHUB_TOKEN or pass --token",),)
}

fn market_lookup(
    config: &ChainConfig,
    base_url: &str,
    timeout: Duration,
) -> Result<MarketLookup<CoinGeckoClient,>, Error,>
{
    Ok(MarketLookup {
        source: CoinGeckoClient::new(base_url, timeout,)?,
        ids:    MarketIds::with_overrides(&config.market_ids,),
    },)
}

fn progress_bar(len: usize,) -> ProgressBar
{
    let progress = ProgressBar::new(len as u64,);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.yellow} [{elapsed_precise}] {pos}/{len} {msg}",)
        .unwrap_or_else(|_| ProgressStyle::default_bar(),);
    progress.set_style(style,);
    progress
}
