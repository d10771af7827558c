//! Transaction logs as returned by the node, and their decoded form.

use serde::{Deserialize, Deserializer, Serialize};

use crate::abi::AbiFragment;
use crate::types::NormalizedValue;

/// A raw log entry (`eth_getTransactionReceipt` / `eth_getLogs` shape).
///
/// Quantity fields accept either JSON numbers or hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default = "empty_data")]
    pub data: String,
    #[serde(default, deserialize_with = "de_quantity")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, deserialize_with = "de_quantity", skip_serializing_if = "Option::is_none")]
    pub transaction_index: Option<u64>,
    #[serde(default, deserialize_with = "de_quantity", skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u64>,
}

fn empty_data() -> String {
    "0x".into()
}

/// Parse a JSON-RPC quantity: `"0x1a"`, `"26"` or `26`.
pub fn parse_quantity(value: &str) -> Option<u64> {
    match value.strip_prefix("0x") {
        Some("") => Some(0),
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn de_quantity<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quantity {
        Num(u64),
        Str(String),
    }
    match Option::<Quantity>::deserialize(de)? {
        None => Ok(None),
        Some(Quantity::Num(n)) => Ok(Some(n)),
        Some(Quantity::Str(s)) => parse_quantity(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid quantity '{s}'"))),
    }
}

impl RawLog {
    /// topic0 without the `0x` prefix, lowercased.
    pub fn topic0(&self) -> Option<String> {
        self.topics
            .first()
            .map(|t| t.strip_prefix("0x").unwrap_or(t).to_lowercase())
    }
}

/// A log after decoding. When no fragment matched, only `log` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedLog {
    #[serde(flatten)]
    pub log: RawLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Signature hash of the matched fragment, hex without `0x`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi: Option<AbiFragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<NormalizedValue>>,
    #[serde(rename = "_addresses", skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
}

impl DecodedLog {
    /// The log passed through untouched.
    pub fn undecoded(log: RawLog) -> Self {
        Self {
            log,
            event: None,
            signature: None,
            abi: None,
            args: None,
            addresses: None,
        }
    }

    pub fn is_decoded(&self) -> bool {
        self.event.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_accept_numbers_and_hex() {
        let log: RawLog = serde_json::from_value(serde_json::json!({
            "address": "0x0000000000000000000000000000000001000006",
            "topics": [],
            "data": "0x",
            "blockNumber": 5650461,
            "transactionIndex": "0x2",
            "logIndex": "7"
        }))
        .unwrap();
        assert_eq!(log.block_number, Some(5_650_461));
        assert_eq!(log.transaction_index, Some(2));
        assert_eq!(log.log_index, Some(7));
    }

    #[test]
    fn bad_quantity_is_rejected() {
        let res: Result<RawLog, _> = serde_json::from_value(serde_json::json!({
            "address": "0x01",
            "blockNumber": "0xzz"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn undecoded_log_serializes_without_event_fields() {
        let decoded = DecodedLog::undecoded(RawLog {
            address: "0xabc".into(),
            data: "0x".into(),
            ..Default::default()
        });
        let json = serde_json::to_value(&decoded).unwrap();
        assert_eq!(json["address"], "0xabc");
        assert!(json.get("event").is_none());
        assert!(json.get("_addresses").is_none());
    }

    #[test]
    fn topic0_is_normalized() {
        let log = RawLog {
            topics: vec!["0xDDF252AD".into()],
            ..Default::default()
        };
        assert_eq!(log.topic0().as_deref(), Some("ddf252ad"));
    }
}
