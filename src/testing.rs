// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory hosts and a loopback HTTP stub used by unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use crate::{
    error::ChainError,
    github::{ContentEnvelope, ReleaseInfo, RepositoryHost},
    market::{MarketCap, MarketDataSource},
};

/// Repository host serving canned releases and files.
///
/// Unknown repositories and files answer like GitHub does for missing
/// resources.
#[derive(Debug, Clone, Default,)]
pub struct FakeHost
{
    releases: HashMap<String, Result<Vec<ReleaseInfo,>, ChainError,>,>,
    files:    HashMap<(String, String, String,), ContentEnvelope,>,
}

impl FakeHost
{
    pub fn with_releases(mut self, repository: &str, releases: Vec<ReleaseInfo,>,) -> Self
    {
        self.releases.insert(repository.to_owned(), Ok(releases,),);
        self
    }

    pub fn with_release_error(mut self, repository: &str, error: ChainError,) -> Self
    {
        self.releases.insert(repository.to_owned(), Err(error,),);
        self
    }

    pub fn with_file(self, repository: &str, path: &str, reference: &str, text: &str,) -> Self
    {
        let envelope = ContentEnvelope {
            content:  Some(STANDARD.encode(text,),),
            encoding: Some("base64".to_owned(),),
            message:  None,
        };
        self.with_envelope(repository, path, reference, envelope,)
    }

    pub fn with_envelope(
        mut self,
        repository: &str,
        path: &str,
        reference: &str,
        envelope: ContentEnvelope,
    ) -> Self
    {
        self.files
            .insert((repository.to_owned(), path.to_owned(), reference.to_owned(),), envelope,);
        self
    }
}

impl RepositoryHost for FakeHost
{
    async fn releases(&self, repository: &str,) -> Result<Vec<ReleaseInfo,>, ChainError,>
    {
        self.releases.get(repository,).cloned().unwrap_or_else(|| {
            Err(ChainError::NotFound {
                what: format!("repository {repository}"),
            },)
        },)
    }

    async fn contents(
        &self,
        repository: &str,
        path: &str,
        reference: &str,
    ) -> Result<ContentEnvelope, ChainError,>
    {
        self.files
            .get(&(repository.to_owned(), path.to_owned(), reference.to_owned(),),)
            .cloned()
            .ok_or_else(|| ChainError::NotFound {
                what: format!("file {path} in repository {repository} at ref {reference}"),
            },)
    }
}

/// Market data source answering from a fixed table and recording requests.
#[derive(Debug, Clone, Default,)]
pub struct FakeMarket
{
    caps:     HashMap<String, MarketCap,>,
    requests: Arc<Mutex<Vec<String,>,>,>,
}

impl FakeMarket
{
    pub fn with_cap(mut self, coin_id: &str, cap: MarketCap,) -> Self
    {
        self.caps.insert(coin_id.to_owned(), cap,);
        self
    }

    pub fn requests(&self,) -> Vec<String,>
    {
        self.requests.lock().map(|requests| requests.clone(),).unwrap_or_default()
    }
}

impl MarketDataSource for FakeMarket
{
    async fn market_cap(&self, coin_id: &str,) -> MarketCap
    {
        if let Ok(mut requests,) = self.requests.lock() {
            requests.push(coin_id.to_owned(),);
        }
        self.caps.get(coin_id,).copied().unwrap_or(MarketCap::NotAvailable,)
    }
}

/// Serves `status` with a JSON `body` to every request on a loopback port.
///
/// Returns the base URL of the server. The server lives until the test
/// runtime shuts down.
pub async fn stub_server(status: u16, body: &str,) -> String
{
    let listener = TcpListener::bind("127.0.0.1:0",).await.expect("failed to bind stub server",);
    let address = listener.local_addr().expect("stub server address",);
    let response = format!(
        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    tokio::spawn(async move {
        while let Ok((mut stream, _,),) = listener.accept().await {
            let mut request = Vec::new();
            let mut buffer = [0_u8; 1024];
            while !request.windows(4,).any(|window| window == b"\r\n\r\n",) {
                match stream.read(&mut buffer,).await {
                    Ok(0,) | Err(_,) => break,
                    Ok(read,) => request.extend_from_slice(&buffer[..read],),
                }
            }
            let _ = stream.write_all(response.as_bytes(),).await;
            let _ = stream.shutdown().await;
        }
    },);

    format!("http://{address}")
}
