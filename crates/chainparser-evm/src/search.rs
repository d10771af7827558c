//! Block-height search and contract deployment discovery.
//!
//! [`binary_search_number`] finds the first height at which a monotone
//! predicate changes value. Both halves of each split are probed
//! concurrently, so a search over `n` blocks issues roughly `2 log2 n`
//! predicate calls.

use std::future::Future;
use std::sync::Arc;

use chainparser_core::node::{Block, BlockTransaction, InternalTransaction, TransactionReceipt};
use chainparser_core::{BlockTag, NodeClient, NodeError};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::proxy::not_zero;

/// Smallest `n` in `(low, high]` where `search(n)` differs from
/// `search(n - 1)`, or `None` when `search(low) == search(high)`.
///
/// The predicate is assumed to change value at most once in the range.
pub fn binary_search_number<'a, F, Fut, T, E>(
    search: &'a F,
    high: u64,
    low: u64,
) -> BoxFuture<'a, Result<Option<u64>, E>>
where
    F: Fn(u64) -> Fut + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'a,
    T: PartialEq + Send + 'a,
    E: Send + 'a,
{
    async move {
        let (at_low, at_high) = futures::try_join!(search(low), search(high))?;
        if at_low == at_high || high <= low {
            return Ok(None);
        }
        if high == low + 1 {
            return Ok(Some(high));
        }
        let mid = low + (high - low) / 2;
        let (upper, lower) = futures::try_join!(
            binary_search_number(search, high, mid),
            binary_search_number(search, mid, low)
        )?;
        Ok(upper.or(lower))
    }
    .boxed()
}

/// Extra inputs for [`BcSearch::deployment_tx`]; anything left `None` is
/// fetched from the node.
#[derive(Debug, Clone, Default)]
pub struct DeploymentQuery {
    pub block_number: Option<u64>,
    pub block: Option<Block>,
    pub block_trace: Option<Vec<InternalTransaction>>,
    pub high_block: Option<u64>,
}

/// How a contract came to exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Deployment {
    /// Created by a top-level transaction with no `to`.
    Transaction {
        tx: BlockTransaction,
        receipt: TransactionReceipt,
        timestamp: u64,
    },
    /// Created by a contract through a `create` internal transaction.
    #[serde(rename_all = "camelCase")]
    Internal {
        internal_tx: InternalTransaction,
        timestamp: u64,
    },
}

impl Deployment {
    pub fn timestamp(&self) -> u64 {
        match self {
            Deployment::Transaction { timestamp, .. } | Deployment::Internal { timestamp, .. } => {
                *timestamp
            }
        }
    }
}

/// Chain searches backed by a node.
#[derive(Clone)]
pub struct BcSearch {
    node: Arc<dyn NodeClient>,
}

impl BcSearch {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Self { node }
    }

    /// [`binary_search_number`] with `high` defaulting to the latest block
    /// and `low` to 1.
    pub async fn block<F, Fut, T>(
        &self,
        search: &F,
        high: Option<u64>,
        low: Option<u64>,
    ) -> Result<Option<u64>, NodeError>
    where
        F: Fn(u64) -> Fut + Sync,
        Fut: Future<Output = Result<T, NodeError>> + Send,
        T: PartialEq + Send,
    {
        let high = match high {
            Some(h) => h,
            None => self.node.block_number().await?,
        };
        let low = low.unwrap_or(1);
        binary_search_number(search, high, low).await
    }

    pub async fn is_contract_at_block(&self, address: &str, number: u64) -> Result<bool, NodeError> {
        let code = self.node.get_code(address, BlockTag::Number(number)).await?;
        Ok(not_zero(&code))
    }

    /// First block where `address` has code.
    pub async fn deployment_block(
        &self,
        address: &str,
        high: Option<u64>,
        low: Option<u64>,
    ) -> Result<Option<u64>, NodeError> {
        let search = move |n: u64| self.is_contract_at_block(address, n);
        let found = self.block(&search, high, low).await?;
        tracing::debug!(address, block = ?found, "deployment block search finished");
        Ok(found)
    }

    /// The transaction, or internal transaction, that deployed `address`.
    pub async fn deployment_tx(
        &self,
        address: &str,
        query: DeploymentQuery,
    ) -> Result<Option<Deployment>, NodeError> {
        let number = match query.block_number {
            Some(n) => n,
            None => match self.deployment_block(address, query.high_block, None).await? {
                Some(n) => n,
                None => return Ok(None),
            },
        };

        let block = match query.block {
            Some(block) => block,
            None => self
                .node
                .get_block(BlockTag::Number(number), true)
                .await?
                .ok_or_else(|| NodeError::InvalidResponse {
                    method: "eth_getBlockByNumber".into(),
                    reason: format!("block {number} not found"),
                })?,
        };

        let creations = block
            .transactions
            .iter()
            .filter(|tx| !tx.to.as_deref().is_some_and(is_address));
        for tx in creations {
            let Some(receipt) = self.node.get_transaction_receipt(&tx.hash).await? else {
                continue;
            };
            if receipt
                .contract_address
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(address))
            {
                return Ok(Some(Deployment::Transaction {
                    tx: tx.clone(),
                    receipt,
                    timestamp: block.timestamp,
                }));
            }
        }

        let trace = match query.block_trace {
            Some(trace) => trace,
            None => self.node.trace_block(&block.hash).await?,
        };
        Ok(trace
            .into_iter()
            .find(|itx| Self::is_itx_deployment(address, itx))
            .map(|internal_tx| Deployment::Internal {
                internal_tx,
                timestamp: block.timestamp,
            }))
    }

    pub fn is_itx_deployment(address: &str, itx: &InternalTransaction) -> bool {
        let created = itx
            .result
            .as_ref()
            .and_then(|r| r.address.as_deref())
            .is_some_and(|a| a.eq_ignore_ascii_case(address));
        itx.kind.as_deref() == Some("create") && created
    }
}

fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|h| h.len() == 40 && h.chars().all(|c| c.is_ascii_hexdigit()))
}
