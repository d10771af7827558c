//! chainparser-rpc: a [`NodeClient`](chainparser_core::NodeClient) over
//! JSON-RPC.
//!
//! ```text
//! ContractParser → RpcNodeClient → [RetryPolicy] → HttpTransport → node
//! ```
//!
//! Node-side errors (reverts, unknown methods) are returned as
//! `NodeError::Rpc` without retrying; connection failures and timeouts are
//! retried with exponential backoff.

pub mod client;
pub mod config;
pub mod error;
pub mod public;
pub mod request;
pub mod retry;
pub mod transport;

pub use client::RpcNodeClient;
pub use config::{NodeConfig, DEFAULT_NODE_URL, NODE_URL_ENV};
pub use error::TransportError;
pub use public::{public_client, public_node_url};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use retry::{RetryConfig, RetryPolicy};
pub use transport::{HttpTransport, RpcTransport};
