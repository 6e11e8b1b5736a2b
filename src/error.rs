// File: src/error.rs
// Failure taxonomy for ledger service lookups

use thiserror::Error;

/// Why a gateway lookup produced no record.
///
/// The navigator never sees these: the `LedgerGateway` trait collapses them
/// into "no result" after logging.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no {kind} found")]
    NotFound { kind: &'static str },
}

pub type Result<T> = std::result::Result<T, GatewayError>;
