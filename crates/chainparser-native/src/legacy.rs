//! Pre-Solidity bridge events.
//!
//! Before the iris upgrade the bridge logged events whose topics[0] is the
//! event name as NUL-padded ASCII and whose data is RLP. Each top-level RLP
//! item is one field, except for `commit_federation`, whose payload nests a
//! `[keys, address]` pair per federation. Byte-string fields are stripped of
//! leading zero bytes (an all-zero field keeps a single zero byte); list
//! fields keep their raw encoding so value filters can unpack them.

use alloy_primitives::U256;
use chainparser_core::{
    error::decode_hex, signature::SignatureData, AbiFragment, AbiParam, DecodeError, DecodedLog,
    Network, NormalizedValue, RawLog,
};
use rlp::Rlp;
use sha2::{Digest, Sha256};

/// Post-processing applied to a raw field before type coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFilter {
    /// RLP list of public keys to an array of byte strings.
    PublicKeyList,
    /// Base58Check federation address, expected to be P2SH on the network.
    BtcAddress(Network),
    /// ASCII decimal number.
    DecimalString,
}

impl ValueFilter {
    fn apply(&self, raw: Vec<u8>) -> NormalizedValue {
        match self {
            ValueFilter::PublicKeyList => match rlp_byte_list(&raw) {
                Some(keys) => NormalizedValue::Array(keys.into_iter().map(NormalizedValue::Bytes).collect()),
                None => NormalizedValue::Bytes(raw),
            },
            ValueFilter::BtcAddress(network) => {
                let address = String::from_utf8_lossy(&raw).into_owned();
                let version = base58check_version(&address);
                if version != Some(network.btc_p2sh_version()) {
                    tracing::debug!(%address, ?version, %network, "federation address is not P2SH for the network");
                }
                NormalizedValue::Str(address)
            }
            ValueFilter::DecimalString => match std::str::from_utf8(&raw).ok().and_then(|s| s.parse().ok()) {
                Some(n) => NormalizedValue::Uint(n),
                None => NormalizedValue::Bytes(raw),
            },
        }
    }
}

/// How an event's RLP payload is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLayout {
    /// One field per top-level item.
    Flat,
    /// `[[keys, address], [keys, address], height]`: the old and new
    /// federations followed by the activation height, one field per leaf.
    FederationChange,
}

/// A legacy event: a synthetic fragment plus per-input filters.
#[derive(Debug, Clone)]
pub struct LegacyEvent {
    pub fragment: AbiFragment,
    pub layout: PayloadLayout,
    filters: Vec<Option<ValueFilter>>,
}

impl LegacyEvent {
    fn new(name: &str, inputs: Vec<(AbiParam, Option<ValueFilter>)>) -> Self {
        let (params, filters) = inputs.into_iter().unzip();
        Self {
            fragment: AbiFragment::event(name, params),
            layout: PayloadLayout::Flat,
            filters,
        }
    }

    fn with_layout(mut self, layout: PayloadLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn name(&self) -> &str {
        self.fragment.name().unwrap_or_default()
    }

    fn fields(&self, data: &str) -> Result<Vec<Vec<u8>>, DecodeError> {
        match self.layout {
            PayloadLayout::Flat => decode_fields(data),
            PayloadLayout::FederationChange => federation_fields(data),
        }
    }
}

/// The legacy event table for a network.
pub fn legacy_events(network: Network) -> Vec<LegacyEvent> {
    let keys = Some(ValueFilter::PublicKeyList);
    let address = Some(ValueFilter::BtcAddress(network));
    vec![
        LegacyEvent::new("update_collections", vec![(AbiParam::new("sender", "address"), None)]),
        LegacyEvent::new(
            "release_btc",
            vec![
                (AbiParam::new("releaseRskTxHash", "bytes32"), None),
                (AbiParam::new("btcRawTransaction", "bytes"), None),
            ],
        ),
        LegacyEvent::new(
            "add_signature",
            vec![
                (AbiParam::new("sender", "address").indexed(true), None),
                (AbiParam::new("releaseRskTxHash", "bytes32"), None),
                (AbiParam::new("executorPublicKey", "bytes"), None),
            ],
        ),
        LegacyEvent::new(
            "commit_federation",
            vec![
                (AbiParam::new("oldFederationBtcPublicKeys", "bytes[]"), keys),
                (AbiParam::new("oldFederationBtcAddress", "string"), address),
                (AbiParam::new("newFederationBtcPublicKeys", "bytes[]"), keys),
                (AbiParam::new("newFederationBtcAddress", "string"), address),
                (AbiParam::new("activationHeight", "uint256"), Some(ValueFilter::DecimalString)),
            ],
        )
        .with_layout(PayloadLayout::FederationChange),
    ]
}

/// Decoder for the legacy event table of one network.
#[derive(Debug, Clone)]
pub struct LegacyDecoder {
    events: Vec<(LegacyEvent, SignatureData)>,
}

impl LegacyDecoder {
    pub fn new(network: Network) -> Self {
        let events = legacy_events(network)
            .into_iter()
            .map(|e| {
                let data = SignatureData::compute(&e.fragment);
                (e, data)
            })
            .collect();
        Self { events }
    }

    pub fn fragments(&self) -> impl Iterator<Item = &AbiFragment> {
        self.events.iter().map(|(e, _)| &e.fragment)
    }

    pub fn find_event(&self, name: &str) -> Option<&(LegacyEvent, SignatureData)> {
        self.events.iter().find(|(e, _)| e.name() == name)
    }

    /// Decode a log whose topics[0] names a legacy event. Anything else is
    /// returned undecoded.
    pub fn decode_log(&self, log: RawLog) -> DecodedLog {
        let Some(name) = log.topics.first().and_then(|t| event_name(t).ok()) else {
            return DecodedLog::undecoded(log);
        };
        let Some((event, data)) = self.find_event(&name) else {
            tracing::debug!(address = %log.address, event = %name, "unknown legacy bridge event");
            return DecodedLog::undecoded(log);
        };

        match decode_args(event, &log) {
            Ok(args) => DecodedLog {
                event: Some(name),
                signature: data.signature.clone(),
                abi: Some(event.fragment.clone()),
                args: Some(args),
                addresses: None,
                log,
            },
            Err(e) => {
                tracing::debug!(address = %log.address, event = %name, error = %e, "legacy payload does not decode");
                DecodedLog::undecoded(log)
            }
        }
    }
}

/// topics[0] as ASCII with NUL padding removed. Bytes are read as 7-bit
/// ASCII.
pub fn event_name(topic: &str) -> Result<String, DecodeError> {
    let bytes = decode_hex(topic)?;
    Ok(bytes
        .into_iter()
        .map(|b| b & 0x7f)
        .filter(|b| *b != 0)
        .map(char::from)
        .collect())
}

/// Top-level RLP items of `data`. A single (non-list) item is one field.
pub fn decode_fields(data: &str) -> Result<Vec<Vec<u8>>, DecodeError> {
    let raw = decode_hex(data)?;
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let top = Rlp::new(&raw);
    if !top.is_list() {
        return Ok(vec![field_bytes(&top)?]);
    }
    top.iter().map(|item| field_bytes(&item)).collect()
}

/// Leaves of a federation change payload: old keys, old address, new keys,
/// new address, activation height.
pub fn federation_fields(data: &str) -> Result<Vec<Vec<u8>>, DecodeError> {
    let raw = decode_hex(data)?;
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let top = Rlp::new(&raw);
    if !top.is_list() {
        return Err(DecodeError::Rlp {
            reason: "federation change payload is not a list".into(),
        });
    }

    let mut fields = Vec::with_capacity(5);
    for federation in top.iter().take(2) {
        if !federation.is_list() {
            return Err(DecodeError::Rlp {
                reason: "federation entry is not a list".into(),
            });
        }
        for item in federation.iter().take(2) {
            fields.push(field_bytes(&item)?);
        }
    }
    if let Some(height) = top.iter().nth(2) {
        fields.push(field_bytes(&height)?);
    }
    Ok(fields)
}

/// Lists keep their raw encoding; byte strings lose leading zeros.
fn field_bytes(item: &Rlp) -> Result<Vec<u8>, DecodeError> {
    if item.is_list() {
        return Ok(item.as_raw().to_vec());
    }
    item.data()
        .map(trim_leading_zeros)
        .map_err(|e| DecodeError::Rlp {
            reason: e.to_string(),
        })
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    match bytes.iter().position(|b| *b != 0) {
        Some(start) => bytes[start..].to_vec(),
        None => bytes.last().map(|b| vec![*b]).unwrap_or_default(),
    }
}

fn rlp_byte_list(raw: &[u8]) -> Option<Vec<Vec<u8>>> {
    let list = Rlp::new(raw);
    if !list.is_list() {
        return None;
    }
    list.iter()
        .map(|item| item.data().map(<[u8]>::to_vec).ok())
        .collect()
}

/// Version byte of a Base58Check string, if it is one.
fn base58check_version(address: &str) -> Option<u8> {
    let bytes = bs58::decode(address).into_vec().ok()?;
    if bytes.len() < 5 {
        return None;
    }
    let (payload, checksum) = bytes.split_at(bytes.len() - 4);
    let digest = Sha256::digest(Sha256::digest(payload));
    (digest[..4] == *checksum).then(|| payload[0])
}

fn coerce(param: &AbiParam, value: NormalizedValue) -> NormalizedValue {
    let NormalizedValue::Bytes(bytes) = value else {
        return value;
    };
    let ty = param.ty.as_str();
    if ty == "address" {
        let low = &bytes[bytes.len().saturating_sub(20)..];
        let mut word = vec![0u8; 20 - low.len()];
        word.extend_from_slice(low);
        NormalizedValue::address(&word)
    } else if ty.starts_with("uint") && !ty.ends_with(']') {
        match U256::try_from_be_slice(&bytes) {
            Some(n) => match u128::try_from(n) {
                Ok(v) => NormalizedValue::Uint(v),
                Err(_) => NormalizedValue::BigUint(n.to_string()),
            },
            None => NormalizedValue::Bytes(bytes),
        }
    } else if ty == "string" {
        NormalizedValue::Str(String::from_utf8_lossy(&bytes).into_owned())
    } else if ty == "bool" {
        NormalizedValue::Bool(bytes.iter().any(|b| *b != 0))
    } else {
        NormalizedValue::Bytes(bytes)
    }
}

/// Indexed inputs consume topics, the rest consume RLP fields, both in
/// order. Empty non-indexed values are dropped.
fn decode_args(event: &LegacyEvent, log: &RawLog) -> Result<Vec<NormalizedValue>, DecodeError> {
    let mut fields = event.fields(&log.data)?.into_iter();
    let mut topics = log.topics.iter().skip(1);
    let mut args = Vec::new();

    for (param, filter) in event.fragment.inputs.iter().zip(&event.filters) {
        if param.is_indexed() {
            if let Some(topic) = topics.next() {
                let raw = decode_hex(topic)?;
                args.push(convert(param, filter.as_ref(), raw));
            }
        } else if let Some(raw) = fields.next() {
            let value = convert(param, filter.as_ref(), raw);
            if !value.is_empty() {
                args.push(value);
            }
        }
    }
    Ok(args)
}

fn convert(param: &AbiParam, filter: Option<&ValueFilter>, raw: Vec<u8>) -> NormalizedValue {
    let value = match filter {
        Some(f) => f.apply(raw),
        None => NormalizedValue::Bytes(raw),
    };
    coerce(param, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlp::RlpStream;

    const SENDER: &str = "47442b55635c9888a2790b598935eb7aac2603e2";

    fn name_topic(name: &str) -> String {
        format!("0x{:0<64}", hex::encode(name))
    }

    fn legacy_log(topics: Vec<String>, data: Vec<u8>) -> RawLog {
        RawLog {
            address: "0x0000000000000000000000000000000001000006".into(),
            topics,
            data: format!("0x{}", hex::encode(data)),
            block_number: Some(500_000),
            ..Default::default()
        }
    }

    #[test]
    fn event_name_strips_padding() {
        assert_eq!(event_name(&name_topic("update_collections")).unwrap(), "update_collections");
    }

    #[test]
    fn decodes_update_collections() {
        let data = rlp::encode(&hex::decode(SENDER).unwrap().as_slice()).to_vec();
        let log = legacy_log(vec![name_topic("update_collections")], data);
        let decoded = LegacyDecoder::new(Network::Testnet).decode_log(log);
        assert_eq!(decoded.event.as_deref(), Some("update_collections"));
        assert_eq!(
            decoded.args.unwrap(),
            vec![NormalizedValue::Address(format!("0x{SENDER}"))]
        );
        assert_eq!(
            decoded.signature.as_deref(),
            Some("1069152f4f916cbf155ee32a695d92258481944edb5b6fd649718fc1b43e515e")
        );
    }

    #[test]
    fn short_address_is_left_padded() {
        let data = rlp::encode(&vec![0x00u8, 0x00, 0x12, 0x34]).to_vec();
        let log = legacy_log(vec![name_topic("update_collections")], data);
        let args = LegacyDecoder::new(Network::Mainnet).decode_log(log).args.unwrap();
        assert_eq!(
            args,
            vec![NormalizedValue::Address(format!("0x{:0>40}", "1234"))]
        );
    }

    #[test]
    fn field_trimming() {
        let mut s = RlpStream::new_list(3);
        s.append(&vec![0u8, 0, 7]);
        s.append(&vec![0u8, 0, 0]);
        s.append(&Vec::<u8>::new());
        let fields = decode_fields(&format!("0x{}", hex::encode(s.out()))).unwrap();
        assert_eq!(fields, vec![vec![7u8], vec![0u8], vec![]]);
    }

    #[test]
    fn empty_data_drops_non_indexed_but_keeps_indexed() {
        let mut s = RlpStream::new_list(2);
        s.append(&vec![0xaau8; 32]);
        s.append(&Vec::<u8>::new());
        let sender_topic = format!("0x{:0>64}", SENDER);
        let log = legacy_log(vec![name_topic("add_signature"), sender_topic], s.out().to_vec());
        let args = LegacyDecoder::new(Network::Testnet).decode_log(log).args.unwrap();
        // executorPublicKey is empty and dropped; the indexed sender stays
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], NormalizedValue::Address(format!("0x{SENDER}")));
        assert_eq!(args[1], NormalizedValue::Bytes(vec![0xaa; 32]));
    }

    /// Base58Check P2SH address of `hash160`.
    fn p2sh(version: u8, hash160: [u8; 20]) -> String {
        let mut payload = vec![version];
        payload.extend_from_slice(&hash160);
        let checksum = Sha256::digest(Sha256::digest(&payload));
        payload.extend_from_slice(&checksum[..4]);
        bs58::encode(payload).into_string()
    }

    /// `[[keys, address], [keys, address], height]` as the bridge logs it.
    fn federation_payload(old: (&[Vec<u8>], &str), new: (&[Vec<u8>], &str), height: &str) -> Vec<u8> {
        let mut s = RlpStream::new_list(3);
        for (keys, address) in [old, new] {
            s.begin_list(2);
            s.begin_list(keys.len());
            for key in keys {
                s.append(key);
            }
            s.append(&address.to_string());
        }
        s.append(&height.to_string());
        s.out().to_vec()
    }

    #[test]
    fn commit_federation_nested_payload() {
        let old_keys = vec![vec![0x02u8; 33], vec![0x03u8; 33]];
        let new_keys = vec![vec![0x02u8; 33]];
        let old_address = p2sh(0x05, [0x11; 20]);
        let new_address = p2sh(0x05, [0x22; 20]);
        let data = federation_payload(
            (&old_keys, &old_address),
            (&new_keys, &new_address),
            "2000000",
        );

        let log = legacy_log(vec![name_topic("commit_federation")], data);
        let decoded = LegacyDecoder::new(Network::Mainnet).decode_log(log);
        assert_eq!(decoded.event.as_deref(), Some("commit_federation"));
        let keys = |k: &[Vec<u8>]| {
            NormalizedValue::Array(k.iter().cloned().map(NormalizedValue::Bytes).collect())
        };
        assert_eq!(
            decoded.args.unwrap(),
            vec![
                keys(&old_keys),
                NormalizedValue::Str(old_address),
                keys(&new_keys),
                NormalizedValue::Str(new_address),
                NormalizedValue::Uint(2_000_000),
            ]
        );
    }

    #[test]
    fn federation_fields_are_the_leaves() {
        let keys = vec![vec![0x02u8; 33]];
        let data = federation_payload((&keys, "2Nabc"), (&keys, "2Ndef"), "42");
        let fields = federation_fields(&format!("0x{}", hex::encode(data))).unwrap();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[1], b"2Nabc".to_vec());
        assert_eq!(fields[4], b"42".to_vec());
    }

    #[test]
    fn flat_federation_payload_is_rejected() {
        let mut s = RlpStream::new_list(2);
        s.append(&vec![0x02u8; 33]);
        s.append(&"7".to_string());
        let err = federation_fields(&format!("0x{}", hex::encode(s.out()))).unwrap_err();
        assert!(matches!(err, DecodeError::Rlp { .. }));
    }

    #[test]
    fn federation_address_on_other_network_is_kept() {
        let keys = vec![vec![0x03u8; 33]];
        let mainnet = p2sh(0x05, [0x33; 20]);
        let data = federation_payload((&keys, &mainnet), (&keys, &mainnet), "10");
        let log = legacy_log(vec![name_topic("commit_federation")], data);
        let args = LegacyDecoder::new(Network::Testnet).decode_log(log).args.unwrap();
        assert_eq!(args[1], NormalizedValue::Str(mainnet));
        assert_eq!(args[4], NormalizedValue::Uint(10));
    }

    #[test]
    fn base58check_versions() {
        // well-known encoding of the all-zero script hash
        assert_eq!(base58check_version("31h1vYVSYuKP6AhS86fbRdMw9XHieotbST"), Some(0x05));
        assert_eq!(base58check_version(&p2sh(0xc4, [0x44; 20])), Some(0xc4));
        assert_eq!(base58check_version("2000000"), None);
    }

    #[test]
    fn decimal_filter() {
        assert_eq!(ValueFilter::DecimalString.apply(b"123".to_vec()), NormalizedValue::Uint(123));
        assert_eq!(ValueFilter::DecimalString.apply(vec![0xff]), NormalizedValue::Bytes(vec![0xff]));
    }

    #[test]
    fn hashed_topic_is_not_a_legacy_event() {
        let topic = "0x1069152f4f916cbf155ee32a695d92258481944edb5b6fd649718fc1b43e515e";
        let log = legacy_log(vec![topic.into()], vec![]);
        assert!(!LegacyDecoder::new(Network::Testnet).decode_log(log).is_decoded());
    }
}
