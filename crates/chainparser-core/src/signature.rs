//! Canonical signatures, selectors and event signature hashes.
//!
//! ```text
//! transfer(address,uint256)
//!   signature = keccak256("transfer(address,uint256)")  (hex, no 0x)
//!   selector  = a9059cbb                                (first 4 bytes)
//! ```
//!
//! Events additionally get an `event_signature`: the hash of the canonical
//! signature followed by the hex of the indexed flags, so two events that
//! differ only in which inputs are indexed never collide.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use crate::abi::{AbiFragment, AbiParam, FragmentKind};

/// Raw keccak256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// keccak256 of a UTF-8 string, hex encoded without `0x`.
pub fn keccak256_hex(input: &str) -> String {
    hex::encode(keccak256(input.as_bytes()))
}

/// Canonical type of a parameter. Tuples expand to `(c1,c2,...)` and keep
/// their array suffix, so `tuple[3]` of `(uint256,address)` becomes
/// `(uint256,address)[3]`.
pub fn canonical_type(param: &AbiParam) -> String {
    let ty = param.ty.as_str();
    if ty != "tuple" && !ty.starts_with("tuple[") {
        return ty.to_string();
    }
    let inner: Vec<String> = param.components.iter().map(canonical_type).collect();
    format!("({}){}", inner.join(","), &ty["tuple".len()..])
}

/// `name(t1,t2,...)`, or `None` for unnamed fragments (fallback, receive,
/// constructor).
pub fn canonical_signature(fragment: &AbiFragment) -> Option<String> {
    let name = fragment.name()?;
    let types: Vec<String> = fragment.inputs.iter().map(canonical_type).collect();
    Some(format!("{name}({})", types.join(",")))
}

/// First 8 hex chars of a signature hash.
pub fn selector(signature_hash: &str) -> String {
    let hash = signature_hash.strip_prefix("0x").unwrap_or(signature_hash);
    hash.chars().take(8).collect()
}

/// Selector of a canonical method signature, e.g. `"transfer(address,uint256)"`.
pub fn method_selector(method: &str) -> String {
    selector(&keccak256_hex(method))
}

/// ERC165 interface id: XOR of the member selectors, `0x`-prefixed.
pub fn erc165_id<S: AsRef<str>>(selectors: &[S]) -> String {
    let mut id = [0u8; 4];
    for sel in selectors {
        let bytes = hex::decode(sel.as_ref()).unwrap_or_default();
        for (acc, b) in id.iter_mut().zip(bytes.iter()) {
            *acc ^= b;
        }
    }
    format!("0x{}", hex::encode(id))
}

/// ERC165 interface id computed from canonical method signatures.
pub fn erc165_id_from_methods<S: AsRef<str>>(methods: &[S]) -> String {
    let selectors: Vec<String> = methods.iter().map(|m| method_selector(m.as_ref())).collect();
    erc165_id(&selectors)
}

/// Everything derived from one ABI fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureData {
    /// Canonical signature, `None` for unnamed fragments.
    pub method: Option<String>,
    /// keccak256 of `method`, hex without `0x`.
    pub signature: Option<String>,
    /// Per-input indexed flags; empty unless the fragment is an event.
    pub index: Vec<bool>,
    /// Count of `true` entries in `index`.
    pub indexed: usize,
    /// Layout-aware event hash; `None` unless the fragment is a named event.
    pub event_signature: Option<String>,
}

impl SignatureData {
    pub fn compute(fragment: &AbiFragment) -> Self {
        let method = canonical_signature(fragment);
        let signature = method.as_deref().map(keccak256_hex);
        let index: Vec<bool> = if fragment.kind == FragmentKind::Event {
            fragment.inputs.iter().map(AbiParam::is_indexed).collect()
        } else {
            Vec::new()
        };
        let indexed = index.iter().filter(|i| **i).count();
        let event_signature = match (&method, fragment.kind) {
            (Some(m), FragmentKind::Event) => Some(event_signature_hash(m, &index)),
            _ => None,
        };
        Self {
            method,
            signature,
            index,
            indexed,
            event_signature,
        }
    }

    pub fn selector(&self) -> Option<String> {
        self.signature.as_deref().map(selector)
    }
}

fn event_signature_hash(method: &str, index: &[bool]) -> String {
    let flags: Vec<u8> = index.iter().map(|i| u8::from(*i)).collect();
    keccak256_hex(&format!("{method}{}", hex::encode(flags)))
}

/// Side table of computed signature data keyed by fragment.
///
/// Fragments are never mutated; lookups hash the fragment by value, so two
/// structurally equal fragments share one entry.
#[derive(Debug, Default, Clone)]
pub struct SignatureTable {
    entries: HashMap<AbiFragment, SignatureData>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table covering every fragment of `abi`.
    pub fn from_abi(abi: &[AbiFragment]) -> Self {
        let mut table = Self::new();
        table.annotate(abi, false);
        table
    }

    /// Compute signature data for each fragment. With `skip_existing`,
    /// fragments already present keep their cached entry.
    pub fn annotate(&mut self, abi: &[AbiFragment], skip_existing: bool) {
        for fragment in abi {
            if skip_existing && self.entries.contains_key(fragment) {
                continue;
            }
            self.entries
                .insert(fragment.clone(), SignatureData::compute(fragment));
        }
    }

    pub fn get(&self, fragment: &AbiFragment) -> Option<&SignatureData> {
        self.entries.get(fragment)
    }

    /// Cached data, or a freshly computed value when the fragment is unknown.
    pub fn get_or_compute(&self, fragment: &AbiFragment) -> SignatureData {
        self.get(fragment)
            .cloned()
            .unwrap_or_else(|| SignatureData::compute(fragment))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keep every non-event fragment, then one event per distinct
/// `event_signature` (first occurrence wins).
pub fn dedupe_events(abi: &[AbiFragment], table: &SignatureTable) -> Vec<AbiFragment> {
    let mut out: Vec<AbiFragment> = abi.iter().filter(|f| !f.is_event()).cloned().collect();
    let mut seen: Vec<Option<String>> = Vec::new();
    for event in abi.iter().filter(|f| f.is_event()) {
        let key = table.get_or_compute(event).event_signature;
        if !seen.contains(&key) {
            seen.push(key);
            out.push(event.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::parse_abi;

    fn transfer_event(indexed: [bool; 3]) -> AbiFragment {
        AbiFragment::event(
            "Transfer",
            vec![
                AbiParam::new("from", "address").indexed(indexed[0]),
                AbiParam::new("to", "address").indexed(indexed[1]),
                AbiParam::new("value", "uint256").indexed(indexed[2]),
            ],
        )
    }

    #[test]
    fn erc20_transfer_signature() {
        let data = SignatureData::compute(&transfer_event([true, true, false]));
        assert_eq!(data.method.as_deref(), Some("Transfer(address,address,uint256)"));
        assert_eq!(
            data.signature.as_deref(),
            Some("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
        assert_eq!(data.index, vec![true, true, false]);
        assert_eq!(data.indexed, 2);
    }

    #[test]
    fn event_signature_depends_on_indexed_layout() {
        let a = SignatureData::compute(&transfer_event([true, true, false]));
        let b = SignatureData::compute(&transfer_event([true, false, false]));
        assert_eq!(a.signature, b.signature);
        assert_ne!(a.event_signature, b.event_signature);
        assert_eq!(
            a.event_signature.as_deref(),
            Some(keccak256_hex("Transfer(address,address,uint256)010100").as_str())
        );
    }

    #[test]
    fn functions_have_no_event_data() {
        let f = AbiFragment::function(
            "transfer",
            vec![AbiParam::new("to", "address"), AbiParam::new("value", "uint256")],
            vec![AbiParam::new("", "bool")],
        );
        let data = SignatureData::compute(&f);
        assert_eq!(data.selector().as_deref(), Some("a9059cbb"));
        assert!(data.index.is_empty());
        assert_eq!(data.indexed, 0);
        assert!(data.event_signature.is_none());
    }

    #[test]
    fn tuple_array_canonicalization() {
        let abi = parse_abi(
            r#"[{"type":"function","name":"submit","inputs":[
                {"name":"orders","type":"tuple[3]","components":[
                    {"name":"amount","type":"uint256"},
                    {"name":"owner","type":"address"}
                ]},
                {"name":"nested","type":"tuple","components":[
                    {"name":"inner","type":"tuple[]","components":[{"name":"x","type":"bytes32"}]},
                    {"name":"flag","type":"bool"}
                ]}
            ]}]"#,
        )
        .unwrap();
        let sig = canonical_signature(&abi[0]).unwrap();
        assert_eq!(sig, "submit((uint256,address)[3],((bytes32)[],bool))");
        assert_eq!(canonical_signature(&abi[0]).unwrap(), sig);
    }

    #[test]
    fn unnamed_fragment_has_no_signature() {
        let abi = parse_abi(r#"[{"type":"fallback"}]"#).unwrap();
        let data = SignatureData::compute(&abi[0]);
        assert!(data.method.is_none());
        assert!(data.signature.is_none());
    }

    #[test]
    fn known_selectors() {
        assert_eq!(method_selector("balanceOf(address)"), "70a08231");
        assert_eq!(method_selector("totalSupply()"), "18160ddd");
        assert_eq!(method_selector("implementation()"), "5c60da1b");
    }

    #[test]
    fn erc165_ids() {
        assert_eq!(erc165_id_from_methods(&["supportsInterface(bytes4)"]), "0x01ffc9a7");
        assert_eq!(
            erc165_id_from_methods(&["name()", "symbol()", "tokenURI(uint256)"]),
            "0x5b5e139f"
        );
    }

    #[test]
    fn annotate_skip_keeps_cached_entries() {
        let event = transfer_event([true, true, false]);
        let mut table = SignatureTable::new();
        table.annotate(std::slice::from_ref(&event), false);
        let first = table.get(&event).cloned().unwrap();
        table.annotate(std::slice::from_ref(&event), true);
        assert_eq!(table.get(&event), Some(&first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn dedupe_keeps_distinct_layouts() {
        let a = transfer_event([true, true, false]);
        let b = transfer_event([true, false, false]);
        let abi = vec![a.clone(), b.clone(), a.clone()];
        let table = SignatureTable::from_abi(&abi);
        let out = dedupe_events(&abi, &table);
        assert_eq!(out, vec![a, b]);
    }
}
