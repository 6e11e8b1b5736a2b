// File: src/ledger_gateway.rs
// Read access to the ledger query service over HTTP

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::data_models::{AppConfig, BlockView, ChainView, TransactionView};
use crate::decoder::{decode_block, decode_chain, decode_transaction};
use crate::error::{self, GatewayError};
use crate::navigator::{FetchOutcome, FetchRequest};

/// The three read operations the explorer consumes.
///
/// Failures never reach the caller: the chain read falls back to an empty
/// chain and the lookups to `None`. Implementations log the cause.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn fetch_full_chain(&self) -> ChainView;
    async fn fetch_block_by_hash(&self, hash: &str) -> Option<BlockView>;
    async fn fetch_transaction_by_hash(&self, hash: &str) -> Option<TransactionView>;
}

/// Gateway backed by the ledger service's JSON endpoints
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.node_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn try_full_chain(&self) -> error::Result<ChainView> {
        let body = self.get_text("chain").await?;
        decode_chain(&body)
    }

    pub async fn try_block(&self, hash: &str) -> error::Result<BlockView> {
        let body = self.get_text(&format!("block/{}", urlencoding::encode(hash))).await?;
        decode_block(&body)
    }

    pub async fn try_transaction(&self, hash: &str) -> error::Result<TransactionView> {
        let body = self.get_text(&format!("transaction/{}", urlencoding::encode(hash))).await?;
        decode_transaction(&body)
    }

    /// GET `{base}/{path}` and return the body of a 2xx response
    async fn get_text(&self, path: &str) -> error::Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| GatewayError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { url, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| GatewayError::Transport { url: url.clone(), source })?;

        if body.trim().is_empty() {
            return Err(GatewayError::NotFound { kind: "payload" });
        }
        Ok(body)
    }
}

#[async_trait]
impl LedgerGateway for HttpGateway {
    async fn fetch_full_chain(&self) -> ChainView {
        match self.try_full_chain().await {
            Ok(chain) => {
                log::info!("Loaded chain with {} block hashes", chain.hashes.len());
                if !chain.is_consistent() {
                    log::warn!(
                        "Chain reports length {} but lists {} hashes",
                        chain.length,
                        chain.hashes.len()
                    );
                }
                chain
            }
            Err(e) => {
                log::warn!("Chain fetch failed: {}", e);
                ChainView::empty()
            }
        }
    }

    async fn fetch_block_by_hash(&self, hash: &str) -> Option<BlockView> {
        self.try_block(hash)
            .await
            .map_err(|e| log::warn!("Block {} unavailable: {}", hash, e))
            .ok()
    }

    async fn fetch_transaction_by_hash(&self, hash: &str) -> Option<TransactionView> {
        self.try_transaction(hash)
            .await
            .map_err(|e| log::warn!("Transaction {} unavailable: {}", hash, e))
            .ok()
    }
}

/// Run `request` in the background and send its outcome to the state owner.
///
/// Nothing is aborted: the receiver decides whether the outcome is still wanted.
pub fn spawn_fetch(
    gateway: Arc<dyn LedgerGateway>,
    request: FetchRequest,
    outcomes: UnboundedSender<FetchOutcome>,
) {
    tokio::spawn(async move {
        let outcome = request.resolve(gateway.as_ref()).await;
        if outcomes.send(outcome).is_err() {
            log::debug!("Fetch settled after its receiver closed");
        }
    });
}
