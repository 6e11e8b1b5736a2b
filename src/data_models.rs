// File: src/data_models.rs
// Shared data structures and models for all interfaces

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::view_model::ExplorerView;

/// Default ledger query service endpoint
pub const DEFAULT_NODE_URL: &str = "http://localhost:5000";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the ledger query service. Read-only after startup.
    pub node_url: String,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// The full chain as exposed by the query service: block hashes in order.
///
/// `length` comes from the service and is not guaranteed to match
/// `hashes.len()`; rendering always walks `hashes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainView {
    #[serde(rename = "chain", default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub length: u64,
}

impl ChainView {
    /// The value reported when the chain could not be fetched
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_consistent(&self) -> bool {
        self.length == self.hashes.len() as u64
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.iter().any(|h| h == hash)
    }
}

/// Block header fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub previous_hash: String,
    #[serde(default)]
    pub transaction_merkle_root: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub difficulty: u64,
    #[serde(default)]
    pub nonce: u64,
}

/// A resolved block with its transaction hashes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockView {
    #[serde(default)]
    pub index: u64,
    #[serde(rename = "transactions")]
    pub transaction_hashes: Vec<String>,
    pub transaction_count: u64,
    #[serde(default)]
    pub header: BlockHeader,
    pub block_hash: String,
    #[serde(default)]
    pub size: u64,
}

impl BlockView {
    pub fn contains_transaction(&self, hash: &str) -> bool {
        self.transaction_hashes.iter().any(|h| h == hash)
    }
}

/// Transfer details covered by the signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub details: TransactionDetails,
    #[serde(default)]
    pub signature: String,
}

/// A resolved transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub transaction_hash: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(rename = "signed_transaction")]
    pub signed: SignedTransaction,
}

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebSocketMessage {
    /// Select a block row in the chain table
    Select { hash: String },

    /// Expand a transaction entry, collapsing any other
    Expand { hash: String },

    /// Expand a transaction entry, or collapse it when already expanded
    Toggle { hash: String },

    /// Collapse the expanded transaction entry
    Collapse,

    /// Current explorer state for this session
    View { view: ExplorerView },

    /// Error response
    Error { message: String },

    /// Ping/Pong for connection health
    Ping,
    Pong,
}
