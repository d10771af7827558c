//! `NodeClient` over JSON-RPC.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use chainparser_core::log::parse_quantity;
use chainparser_core::node::{Block, InternalTransaction, TransactionReceipt};
use chainparser_core::{BlockTag, NodeClient, NodeError};

use crate::config::NodeConfig;
use crate::error::TransportError;
use crate::request::JsonRpcRequest;
use crate::transport::{HttpTransport, RpcTransport};

/// Node reads mapped onto `eth_*` and `trace_*` calls of any transport.
pub struct RpcNodeClient<T: RpcTransport = HttpTransport> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: RpcTransport> std::fmt::Debug for RpcNodeClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNodeClient")
            .field("url", &self.transport.url())
            .finish()
    }
}

impl RpcNodeClient<HttpTransport> {
    /// HTTP client for the configured endpoint.
    pub fn from_config(config: &NodeConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.url(), config.retry.clone(), config.timeout())?;
        Ok(Self::new(transport))
    }
}

impl<T: RpcTransport> RpcNodeClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<R, NodeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(id, method, "rpc request");
        let resp = self
            .transport
            .send(JsonRpcRequest::new(id, method, params))
            .await?;
        let result = resp
            .into_result()
            .map_err(|e| NodeError::from(TransportError::Rpc(e)))?;
        serde_json::from_value(result).map_err(|e| NodeError::InvalidResponse {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl<T: RpcTransport> NodeClient for RpcNodeClient<T> {
    async fn get_code(&self, address: &str, block: BlockTag) -> Result<String, NodeError> {
        self.request("eth_getCode", vec![json!(address), json!(block)])
            .await
    }

    async fn get_storage_at(
        &self,
        address: &str,
        slot: &str,
        block: BlockTag,
    ) -> Result<String, NodeError> {
        self.request("eth_getStorageAt", vec![json!(address), json!(slot), json!(block)])
            .await
    }

    async fn call(&self, to: &str, data: &str, block: BlockTag) -> Result<String, NodeError> {
        self.request("eth_call", vec![json!({ "to": to, "data": data }), json!(block)])
            .await
    }

    async fn block_number(&self) -> Result<u64, NodeError> {
        let hex: String = self.request("eth_blockNumber", vec![]).await?;
        parse_quantity(&hex).ok_or_else(|| NodeError::InvalidResponse {
            method: "eth_blockNumber".into(),
            reason: format!("not a quantity: {hex}"),
        })
    }

    async fn get_block(
        &self,
        block: BlockTag,
        full_transactions: bool,
    ) -> Result<Option<Block>, NodeError> {
        self.request(
            "eth_getBlockByNumber",
            vec![json!(block), json!(full_transactions)],
        )
        .await
    }

    async fn get_transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        self.request("eth_getTransactionReceipt", vec![json!(hash)])
            .await
    }

    async fn trace_block(&self, block_hash: &str) -> Result<Vec<InternalTransaction>, NodeError> {
        let traces: Option<Vec<InternalTransaction>> =
            self.request("trace_block", vec![json!(block_hash)]).await?;
        Ok(traces.unwrap_or_default())
    }
}
