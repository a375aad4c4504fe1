// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Market capitalization lookups through the CoinGecko API.
///
/// Repositories are mapped to CoinGecko coin identifiers through an
/// immutable table built once at startup. Lookups never fail the chain:
/// missing mappings and failed requests degrade to sentinel values.
use std::{collections::HashMap, fmt, time::Duration};

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::Error;

/// Public CoinGecko v3 endpoint.
pub const DEFAULT_MARKET_API: &str = "https://api.coingecko.com/api/v3";

/// Repository to CoinGecko identifier pairs shipped with the binary.
const BUILTIN_MARKET_IDS: &[(&str, &str,)] = &[
    ("cosmos/gaia", "cosmos",),
    ("osmosis-labs/osmosis", "osmosis",),
    ("evmos/evmos", "evmos",),
    ("celestiaorg/celestia-app", "celestia",),
    ("dydxprotocol/v4-chain", "dydx-chain",),
    ("neutron-org/neutron", "neutron-3",),
    ("akash-network/node", "akash-network",),
    ("persistenceOne/persistenceCore", "persistence",),
    ("CosmosContracts/juno", "juno-network",),
    ("stride-Labs/stride", "stride",),
    ("sei-protocol/sei-chain", "sei-network",),
    ("injective-labs/injective-chain-releases", "injective-protocol",),
    ("dymensionxyz/dymension", "dymension",),
    ("axelarnetwork/axelar-core", "axelar",),
    ("kava-labs/kava", "kava",),
    ("cronos-labs/cronos", "crypto-com-chain",),
    ("crypto-org-chain/cronos", "crypto-com-chain",),
    ("regen-network/regen-ledger", "regen",),
    ("irisnet/irishub", "iris-network",),
    ("cheqd/cheqd-node", "cheqd-network",),
];

/// Market capitalization of one chain's token.
#[derive(Debug, Clone, Copy, PartialEq,)]
pub enum MarketCap
{
    /// Capitalization in US dollars.
    Usd(f64,),
    /// No mapping exists or the provider has no figure (`N/A`).
    NotAvailable,
    /// The provider request failed (`Error`).
    Unavailable,
}

impl fmt::Display for MarketCap
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Usd(value,) => f.write_str(&format_usd(*value,),),
            Self::NotAvailable => f.write_str("N/A",),
            Self::Unavailable => f.write_str("Error",),
        }
    }
}

/// Formats a dollar amount as `$X,XXX.XX`.
///
/// Non-finite values render as `N/A`.
///
/// # Examples
///
/// ```
/// use chainver::format_usd;
///
/// assert_eq!(format_usd(1234567.8,), "$1,234,567.80");
/// assert_eq!(format_usd(0.5,), "$0.50");
/// ```
pub fn format_usd(value: f64,) -> String
{
    if !value.is_finite() {
        return "N/A".to_owned();
    }

    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3,);
    for (index, digit,) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',',);
        }
        grouped.push(digit,);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction:02}")
}

/// Immutable repository to coin identifier mapping.
#[derive(Debug, Clone, Default,)]
pub struct MarketIds
{
    ids: HashMap<String, String,>,
}

impl MarketIds
{
    /// Builds the table from the built-in pairs followed by `overrides`.
    pub fn with_overrides<'a, I,>(overrides: I,) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String,),>,
    {
        let mut ids: HashMap<String, String,> = BUILTIN_MARKET_IDS
            .iter()
            .map(|(repository, id,)| ((*repository).to_owned(), (*id).to_owned(),),)
            .collect();
        for (repository, id,) in overrides {
            ids.insert(repository.clone(), id.clone(),);
        }

        Self {
            ids,
        }
    }

    /// Returns the coin identifier mapped to `repository`.
    pub fn get(&self, repository: &str,) -> Option<&str,>
    {
        self.ids.get(repository,).map(String::as_str,)
    }
}

/// Source of market capitalization figures keyed by provider identifier.
pub trait MarketDataSource
{
    /// Queries the capitalization of `coin_id`, degrading to a sentinel.
    fn market_cap(&self, coin_id: &str,) -> impl Future<Output = MarketCap,> + Send;
}

/// Looks up the capitalization of `repository`'s token.
///
/// Repositories without a mapping yield [`MarketCap::NotAvailable`] without
/// issuing a request.
pub async fn fetch_market_cap<S,>(source: &S, ids: &MarketIds, repository: &str,) -> MarketCap
where
    S: MarketDataSource,
{
    match ids.get(repository,) {
        Some(coin_id,) => source.market_cap(coin_id,).await,
        None => {
            error!("CoinGecko ID not found for repo: {}", repository);
            MarketCap::NotAvailable
        }
    }
}

/// Extracts `market_data.market_cap.usd` from a CoinGecko coin payload.
pub fn market_cap_from_payload(payload: &Value,) -> MarketCap
{
    payload
        .pointer("/market_data/market_cap/usd",)
        .and_then(Value::as_f64,)
        .map_or(MarketCap::NotAvailable, MarketCap::Usd,)
}

/// [`MarketDataSource`] backed by the unauthenticated CoinGecko API.
#[derive(Debug, Clone,)]
pub struct CoinGeckoClient
{
    client:   reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient
{
    /// Builds a client for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration,) -> Result<Self, Error,>
    {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),)
            .timeout(timeout,)
            .build()
            .map_err(|e| Error::client(format!("failed to initialize CoinGecko client: {e}"),),)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/',).to_owned(),
        },)
    }
}

impl MarketDataSource for CoinGeckoClient
{
    async fn market_cap(&self, coin_id: &str,) -> MarketCap
    {
        let url = format!("{}/coins/{coin_id}", self.base_url);
        debug!("Fetching market data from {}", url);

        let response = match self.client.get(&url,).send().await {
            Ok(response,) => response,
            Err(e,) => {
                warn!("CoinGecko request for {} failed: {}", coin_id, e);
                return MarketCap::Unavailable;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!("CoinGecko has no coin with ID {}", coin_id);
            return MarketCap::NotAvailable;
        }
        if !status.is_success() {
            warn!("CoinGecko returned {} for {}", status, coin_id);
            return MarketCap::Unavailable;
        }

        match response.json::<Value,>().await {
            Ok(payload,) => market_cap_from_payload(&payload,),
            Err(e,) => {
                warn!("CoinGecko payload for {} could not be decoded: {}", coin_id, e);
                MarketCap::Unavailable
            }
        }
    }
}
