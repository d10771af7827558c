//! Transport-level errors and their mapping onto `NodeError`.

use chainparser_core::NodeError;
use thiserror::Error;

use crate::request::JsonRpcError;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, reset, non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Error object returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl TransportError {
    /// Transient failures worth another attempt. Node-side errors are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

impl From<TransportError> for NodeError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Rpc(err) => NodeError::Rpc {
                code: err.code,
                message: err.message,
            },
            TransportError::Deserialization(err) => NodeError::Deserialization(err),
            other => NodeError::Transport(other.to_string()),
        }
    }
}
