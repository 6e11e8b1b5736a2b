// File: src/decoder.rs
// Wire decoding for ledger service responses

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::data_models::{BlockView, ChainView, TransactionView};
use crate::error::{GatewayError, Result};

/// Body of `GET /transaction/{hash}`
#[derive(Deserialize)]
struct TransactionEnvelope {
    #[serde(default)]
    transaction: Value,
}

pub fn decode_chain(body: &str) -> Result<ChainView> {
    match serde_json::from_str::<Value>(body)? {
        Value::Null => Err(GatewayError::NotFound { kind: "chain" }),
        value => Ok(serde_json::from_value(value)?),
    }
}

/// The block endpoint answers with a JSON string holding the block JSON.
pub fn decode_block(body: &str) -> Result<BlockView> {
    let outer = serde_json::from_str::<Value>(body)?;
    decode_layer(outer, "block")
}

/// The transaction endpoint wraps a JSON-encoded string in `{"transaction": ..}`.
pub fn decode_transaction(body: &str) -> Result<TransactionView> {
    let envelope: TransactionEnvelope = serde_json::from_str(body)?;
    decode_layer(envelope.transaction, "transaction")
}

/// Decode a value that is either the record itself or a string encoding it.
fn decode_layer<T: DeserializeOwned>(value: Value, kind: &'static str) -> Result<T> {
    match value {
        Value::Null => Err(GatewayError::NotFound { kind }),
        Value::String(inner) => match serde_json::from_str::<Value>(&inner)? {
            Value::Null => Err(GatewayError::NotFound { kind }),
            record => Ok(serde_json::from_value(record)?),
        },
        record => Ok(serde_json::from_value(record)?),
    }
}
