//! `EventDecoder`: standard Solidity log decoding.
//!
//! A fragment matches a log when its signature hash equals topics[0] and its
//! indexed-input count equals the number of remaining topics. Indexed inputs
//! are read from topics[1..] in order, the rest from `data`.
//!
//! Indexed reference types (string, bytes, arrays, tuples) are stored as the
//! keccak256 of their encoding; the 32-byte hash is returned as bytes.

use alloy_core::dyn_abi::DynSolType;
use chainparser_core::{
    error::decode_hex,
    signature::{canonical_type, dedupe_events, SignatureData, SignatureTable},
    AbiFragment, AbiParam, DecodeError, DecodedLog, NormalizedValue, RawLog,
};

use crate::normalizer;

/// Event decoder over a fixed ABI. Cheap to share; holds no node handle.
#[derive(Debug, Clone, Default)]
pub struct EventDecoder {
    events: Vec<(AbiFragment, SignatureData)>,
}

impl EventDecoder {
    /// Build from an ABI; non-event fragments are ignored and events with
    /// an identical indexed layout are kept once.
    pub fn new(abi: &[AbiFragment]) -> Self {
        Self::with_table(abi, &SignatureTable::from_abi(abi))
    }

    /// Build using precomputed signature data.
    pub fn with_table(abi: &[AbiFragment], table: &SignatureTable) -> Self {
        let events = dedupe_events(abi, table)
            .into_iter()
            .filter(|f| f.is_event() && f.anonymous != Some(true))
            .map(|f| {
                let data = table.get_or_compute(&f);
                (f, data)
            })
            .filter(|(_, data)| data.signature.is_some())
            .collect();
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The fragment that decodes a log with these topics, if any.
    pub fn find_event(&self, topics: &[String]) -> Option<&(AbiFragment, SignatureData)> {
        let topic0 = topics.first()?;
        let topic0 = topic0.strip_prefix("0x").unwrap_or(topic0).to_lowercase();
        let indexed = topics.len() - 1;
        let mut matches = self
            .events
            .iter()
            .filter(|(_, data)| data.signature.as_deref() == Some(topic0.as_str()) && data.indexed == indexed);
        let first = matches.next()?;
        let others = matches.count();
        if others > 0 {
            tracing::warn!(
                topic0 = %topic0,
                candidates = others + 1,
                "duplicate event fragments for log, using the first"
            );
        }
        Some(first)
    }

    /// Decode one log. Logs that match nothing, or whose payload does not
    /// fit the matched fragment, come back undecoded.
    pub fn decode_log(&self, log: RawLog) -> DecodedLog {
        let Some((fragment, data)) = self.find_event(&log.topics) else {
            tracing::debug!(address = %log.address, "no event fragment matches log");
            return DecodedLog::undecoded(log);
        };

        match decode_args(fragment, &log) {
            Ok(args) => DecodedLog {
                event: fragment.name().map(str::to_string),
                signature: data.signature.clone(),
                abi: Some(fragment.clone()),
                args: Some(args),
                addresses: None,
                log,
            },
            Err(e) => {
                tracing::debug!(
                    address = %log.address,
                    event = ?fragment.name(),
                    error = %e,
                    "event payload does not decode"
                );
                DecodedLog::undecoded(log)
            }
        }
    }
}

fn resolve(param: &AbiParam) -> Result<DynSolType, DecodeError> {
    let canonical = canonical_type(param);
    DynSolType::parse(&canonical).map_err(|e| DecodeError::AbiDecodeFailed {
        reason: format!("type '{canonical}': {e}"),
    })
}

fn is_hashed_when_indexed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

fn decode_topic(topic: &str, param: &AbiParam) -> Result<NormalizedValue, DecodeError> {
    let bytes = decode_hex(topic)?;
    let ty = resolve(param)?;
    if is_hashed_when_indexed(&ty) {
        return Ok(NormalizedValue::Bytes(bytes));
    }
    ty.abi_decode(&bytes)
        .map(normalizer::normalize)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: format!("topic '{}': {e}", param.name),
        })
}

/// Arguments in input order.
fn decode_args(fragment: &AbiFragment, log: &RawLog) -> Result<Vec<NormalizedValue>, DecodeError> {
    let data_params: Vec<&AbiParam> = fragment.inputs.iter().filter(|p| !p.is_indexed()).collect();
    let mut data_values = if data_params.is_empty() {
        Vec::new()
    } else {
        let types = data_params
            .iter()
            .map(|p| resolve(p))
            .collect::<Result<Vec<_>, _>>()?;
        let raw = decode_hex(&log.data)?;
        match DynSolType::Tuple(types).abi_decode_params(&raw) {
            Ok(alloy_core::dyn_abi::DynSolValue::Tuple(vals)) => vals,
            Ok(other) => vec![other],
            Err(e) => {
                return Err(DecodeError::AbiDecodeFailed {
                    reason: format!("data: {e}"),
                })
            }
        }
    }
    .into_iter();

    let mut topics = log.topics.iter().skip(1);
    let mut args = Vec::with_capacity(fragment.inputs.len());
    for param in &fragment.inputs {
        let value = if param.is_indexed() {
            let topic = topics.next().ok_or_else(|| DecodeError::AbiDecodeFailed {
                reason: format!("missing topic for '{}'", param.name),
            })?;
            decode_topic(topic, param)?
        } else {
            data_values
                .next()
                .map(normalizer::normalize)
                .unwrap_or(NormalizedValue::Null)
        };
        args.push(value);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_abi;

    const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    fn erc20_transfer_log() -> RawLog {
        RawLog {
            address: "0x2acc95758f8b5f583470ba265eb685a8f45fc9d5".into(),
            topics: vec![
                TRANSFER_TOPIC.into(),
                "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045".into(),
                "0x000000000000000000000000ab5801a7d398351b8be11c439e05c5b3259aec9b".into(),
            ],
            data: format!("0x{:064x}", 1_000_000_000_000_000_000u128),
            block_number: Some(19_000_000),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_erc20_transfer() {
        let decoder = EventDecoder::new(&default_abi().unwrap());
        let decoded = decoder.decode_log(erc20_transfer_log());
        assert_eq!(decoded.event.as_deref(), Some("Transfer"));
        assert_eq!(
            decoded.signature.as_deref(),
            Some("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
        let args = decoded.args.unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(
            args[0],
            NormalizedValue::Address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045".into())
        );
        assert_eq!(args[2], NormalizedValue::Uint(1_000_000_000_000_000_000));
        assert_eq!(decoded.abi.unwrap().indexed_count(), 2);
    }

    #[test]
    fn indexed_count_selects_erc721_layout() {
        let mut log = erc20_transfer_log();
        log.topics.push(format!("0x{:064x}", 7));
        log.data = "0x".into();
        let decoded = EventDecoder::new(&default_abi().unwrap()).decode_log(log);
        let args = decoded.args.unwrap();
        assert_eq!(decoded.abi.unwrap().indexed_count(), 3);
        assert_eq!(args[2], NormalizedValue::Uint(7));
    }

    #[test]
    fn unknown_topic_returns_log_unchanged() {
        let mut log = erc20_transfer_log();
        log.topics[0] = format!("0x{}", "11".repeat(32));
        let decoded = EventDecoder::new(&default_abi().unwrap()).decode_log(log.clone());
        assert!(!decoded.is_decoded());
        assert_eq!(decoded.log, log);
        assert!(decoded.args.is_none());
    }

    #[test]
    fn no_topics_is_a_miss() {
        let log = RawLog {
            address: "0x01".into(),
            data: "0x".into(),
            ..Default::default()
        };
        assert!(!EventDecoder::new(&default_abi().unwrap()).decode_log(log).is_decoded());
    }

    #[test]
    fn truncated_data_is_a_miss() {
        let mut log = erc20_transfer_log();
        log.data = "0x1234".into();
        assert!(!EventDecoder::new(&default_abi().unwrap()).decode_log(log).is_decoded());
    }

    #[test]
    fn indexed_bytes_are_kept_as_hash() {
        let abi = chainparser_core::abi::parse_abi(
            r#"[{"type":"event","name":"Named","anonymous":false,"inputs":[
                {"name":"label","type":"string","indexed":true},
                {"name":"payload","type":"bytes","indexed":false}
            ]}]"#,
        )
        .unwrap();
        let topic0 = format!("0x{}", chainparser_core::keccak256_hex("Named(string,bytes)"));
        let label_hash = format!("0x{}", "ab".repeat(32));
        let log = RawLog {
            address: "0x01".into(),
            topics: vec![topic0, label_hash],
            data: format!("0x{:064x}{:064x}{:0<64}", 32, 2, "beef"),
            ..Default::default()
        };
        let args = EventDecoder::new(&abi).decode_log(log).args.unwrap();
        assert_eq!(args[0], NormalizedValue::Bytes(vec![0xab; 32]));
        assert_eq!(args[1], NormalizedValue::Bytes(vec![0xbe, 0xef]));
    }
}
