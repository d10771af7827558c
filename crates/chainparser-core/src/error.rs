//! Error types for the ChainParser pipeline.
//!
//! Decoding misses (no matching fragment, no proxy slot set) are not errors;
//! they are represented in the returned data.

use thiserror::Error;

/// Invalid caller input or configuration. Never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported network: {network}")]
    UnsupportedNetwork { network: String },

    #[error("Invalid block height: {value}")]
    InvalidHeight { value: String },

    #[error("Invalid ABI: {reason}")]
    InvalidAbi { reason: String },

    #[error("Invalid address: {value}")]
    InvalidAddress { value: String },

    #[error("Native contract decoding requires a configured network id")]
    NativeDecoderMissing,

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by a `NodeClient` implementation.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid node response for {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    #[error("Node does not support {method}")]
    Unsupported { method: String },

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

/// Errors raised while decoding a single value or payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("ABI encode failed: {reason}")]
    AbiEncodeFailed { reason: String },

    #[error("RLP decode failed: {reason}")]
    Rlp { reason: String },

    #[error("Invalid hex '{value}': {reason}")]
    InvalidHex { value: String, reason: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },
}

/// Top-level error returned by parser operations.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Beacon {beacon} did not resolve an implementation: {reason}")]
    BeaconResolution { beacon: String, reason: String },
}

/// Decode a `0x`-prefixed (or bare) hex string into bytes.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, DecodeError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    let padded;
    let raw = if raw.len() % 2 == 1 {
        padded = format!("0{raw}");
        padded.as_str()
    } else {
        raw
    };
    hex::decode(raw).map_err(|e| DecodeError::InvalidHex {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
