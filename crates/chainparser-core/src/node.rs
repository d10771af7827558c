//! The node collaborator.
//!
//! Every remote read goes through [`NodeClient`]. Implementations own their
//! transport, retries and timeouts; callers only see `NodeError`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, NodeError};
use crate::log::{parse_quantity, RawLog};

/// Block selector for state reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Earliest,
    Pending,
    Number(u64),
}

impl BlockTag {
    pub fn number(&self) -> Option<u64> {
        match self {
            BlockTag::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<u64> for BlockTag {
    fn from(n: u64) -> Self {
        BlockTag::Number(n)
    }
}

/// JSON-RPC form: tags verbatim, numbers as `0x` hex.
impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Latest => f.write_str("latest"),
            BlockTag::Earliest => f.write_str("earliest"),
            BlockTag::Pending => f.write_str("pending"),
            BlockTag::Number(n) => write!(f, "{n:#x}"),
        }
    }
}

impl FromStr for BlockTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(BlockTag::Latest),
            "earliest" => Ok(BlockTag::Earliest),
            "pending" => Ok(BlockTag::Pending),
            other => parse_quantity(other)
                .map(BlockTag::Number)
                .ok_or_else(|| ConfigError::InvalidHeight {
                    value: other.to_string(),
                }),
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A transaction as embedded in a block fetched with full transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTransaction {
    pub hash: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "crate::node::de_opt_quantity")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(deserialize_with = "de_quantity")]
    pub number: u64,
    pub hash: String,
    #[serde(default, deserialize_with = "de_quantity")]
    pub timestamp: u64,
    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub logs: Vec<RawLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceResult {
    #[serde(default)]
    pub address: Option<String>,
}

/// One entry of `trace_block`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalTransaction {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub result: Option<TraceResult>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub action: serde_json::Value,
}

fn de_quantity<'de, D: serde::Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    de_opt_quantity(de)?.ok_or_else(|| serde::de::Error::custom("missing quantity"))
}

pub(crate) fn de_opt_quantity<'de, D: serde::Deserializer<'de>>(
    de: D,
) -> Result<Option<u64>, D::Error> {
    match Option::<serde_json::Value>::deserialize(de)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid quantity {n}"))),
        Some(serde_json::Value::String(s)) => parse_quantity(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid quantity '{s}'"))),
        Some(other) => Err(serde::de::Error::custom(format!("invalid quantity {other}"))),
    }
}

/// Read access to an RSK/EVM node.
///
/// Only the first three methods are needed for contract details; the rest
/// back deployment discovery and default to `NodeError::Unsupported`.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// `eth_getCode`; `"0x"` when there is no code.
    async fn get_code(&self, address: &str, block: BlockTag) -> Result<String, NodeError>;

    /// `eth_getStorageAt`; a 32-byte hex word.
    async fn get_storage_at(
        &self,
        address: &str,
        slot: &str,
        block: BlockTag,
    ) -> Result<String, NodeError>;

    /// `eth_call` with raw calldata; returns the raw return data.
    async fn call(&self, to: &str, data: &str, block: BlockTag) -> Result<String, NodeError>;

    async fn block_number(&self) -> Result<u64, NodeError> {
        Err(NodeError::Unsupported {
            method: "eth_blockNumber".into(),
        })
    }

    async fn get_block(
        &self,
        _block: BlockTag,
        _full_transactions: bool,
    ) -> Result<Option<Block>, NodeError> {
        Err(NodeError::Unsupported {
            method: "eth_getBlockByNumber".into(),
        })
    }

    async fn get_transaction_receipt(
        &self,
        _hash: &str,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        Err(NodeError::Unsupported {
            method: "eth_getTransactionReceipt".into(),
        })
    }

    async fn trace_block(&self, _block_hash: &str) -> Result<Vec<InternalTransaction>, NodeError> {
        Err(NodeError::Unsupported {
            method: "trace_block".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tag_display_is_rpc_form() {
        assert_eq!(BlockTag::Latest.to_string(), "latest");
        assert_eq!(BlockTag::Number(26).to_string(), "0x1a");
        assert_eq!(BlockTag::Number(0).to_string(), "0x0");
    }

    #[test]
    fn block_tag_parse() {
        assert_eq!("latest".parse::<BlockTag>().unwrap(), BlockTag::Latest);
        assert_eq!("5650461".parse::<BlockTag>().unwrap(), BlockTag::Number(5_650_461));
        assert_eq!("0x1a".parse::<BlockTag>().unwrap(), BlockTag::Number(26));
        assert!(matches!(
            "tomorrow".parse::<BlockTag>(),
            Err(ConfigError::InvalidHeight { .. })
        ));
    }

    #[test]
    fn block_deserializes_hex_fields() {
        let block: Block = serde_json::from_value(serde_json::json!({
            "number": "0xa06b5",
            "hash": "0xabc",
            "timestamp": "0x5c",
            "transactions": [{"hash": "0x01", "to": null, "blockNumber": "0xa06b5"}]
        }))
        .unwrap();
        assert_eq!(block.number, 657_077);
        assert_eq!(block.timestamp, 92);
        assert_eq!(block.transactions[0].to, None);
        assert_eq!(block.transactions[0].block_number, Some(657_077));
    }

    struct CodeOnly;

    #[async_trait]
    impl NodeClient for CodeOnly {
        async fn get_code(&self, _: &str, _: BlockTag) -> Result<String, NodeError> {
            Ok("0x".into())
        }
        async fn get_storage_at(&self, _: &str, _: &str, _: BlockTag) -> Result<String, NodeError> {
            Ok(format!("0x{}", "0".repeat(64)))
        }
        async fn call(&self, _: &str, _: &str, _: BlockTag) -> Result<String, NodeError> {
            Ok("0x".into())
        }
    }

    #[tokio::test]
    async fn optional_methods_default_to_unsupported() {
        let node = CodeOnly;
        assert!(matches!(
            node.block_number().await,
            Err(NodeError::Unsupported { .. })
        ));
        assert_eq!(node.get_code("0x01", BlockTag::Latest).await.unwrap(), "0x");
    }
}
