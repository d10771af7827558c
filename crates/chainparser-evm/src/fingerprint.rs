//! Bytecode fingerprinting.
//!
//! A method is considered present when its 4-byte selector occurs anywhere in
//! the deployed bytecode hex. This is a substring heuristic, not a PUSH4
//! check: selector bytes that happen to appear inside constants also match.

use chainparser_core::{signature::SignatureTable, AbiFragment};
use indexmap::IndexMap;

/// Canonical signature → selector for every named function of `abi`,
/// in ABI order. Duplicate signatures keep their first position.
pub fn selectors_from_abi(abi: &[AbiFragment], table: &SignatureTable) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for fragment in abi.iter().filter(|f| f.is_function()) {
        let data = table.get_or_compute(fragment);
        if let (Some(method), Some(selector)) = (data.method.clone(), data.selector()) {
            out.entry(method).or_insert(selector);
        }
    }
    out
}

/// Signatures whose selector appears in `bytecode`. Missing or empty code
/// matches nothing.
pub fn match_methods(bytecode: Option<&str>, candidates: &IndexMap<String, String>) -> Vec<String> {
    let code = match bytecode {
        Some(code) => code.strip_prefix("0x").unwrap_or(code).to_lowercase(),
        None => return Vec::new(),
    };
    if code.is_empty() {
        return Vec::new();
    }
    candidates
        .iter()
        .filter(|(_, selector)| !selector.is_empty() && code.contains(&selector.to_lowercase()))
        .map(|(method, _)| method.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_abi;

    fn candidates() -> IndexMap<String, String> {
        let abi = default_abi().unwrap();
        selectors_from_abi(&abi, &SignatureTable::from_abi(&abi))
    }

    #[test]
    fn selector_table_is_keyed_by_signature() {
        let c = candidates();
        assert_eq!(c["transfer(address,uint256)"], "a9059cbb");
        assert_eq!(c["balanceOf(address)"], "70a08231");
        assert_eq!(c["decimals()"], "313ce567");
        assert_eq!(c["proxiableUUID()"], "52d1902d");
    }

    #[test]
    fn matches_selector_anywhere_in_code() {
        // a9059cbb buried inside a PUSH32 constant still counts
        let code = "0x7f00000000a9059cbb0000000000000000000000000000000000000000000000";
        assert_eq!(match_methods(Some(code), &candidates()), vec!["transfer(address,uint256)"]);
    }

    #[test]
    fn uppercase_bytecode_matches() {
        let code = "0x6080604052348015600F57600080FD5B5063A9059CBB";
        assert_eq!(match_methods(Some(code), &candidates()), vec!["transfer(address,uint256)"]);
    }

    #[test]
    fn empty_code_matches_nothing() {
        let c = candidates();
        assert!(match_methods(None, &c).is_empty());
        assert!(match_methods(Some(""), &c).is_empty());
        assert!(match_methods(Some("0x"), &c).is_empty());
    }
}
