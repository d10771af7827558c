//! Collect the addresses an event mentions.

use chainparser_core::{AbiFragment, DecodedLog, NormalizedValue};

/// Addresses carried by `address` and `address[]` inputs, in input order,
/// without repeats. Inputs are paired with `args` by position.
pub fn event_addresses(abi: &AbiFragment, args: &[NormalizedValue]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |addr: String| {
        if !out.contains(&addr) {
            out.push(addr);
        }
    };

    for (input, value) in abi.inputs.iter().zip(args) {
        match input.ty.as_str() {
            "address" => {
                if let Some(addr) = value_address(value) {
                    push(addr);
                }
            }
            "address[]" => match value {
                NormalizedValue::Array(items) => {
                    items.iter().filter_map(value_address).for_each(&mut push);
                }
                // packed hex as produced by the legacy bridge decoder
                other => {
                    if let Some(packed) = value_hex(other) {
                        split_packed(&packed).into_iter().for_each(&mut push);
                    }
                }
            },
            _ => {}
        }
    }
    out
}

/// Set `_addresses` on a decoded log. Logs without an ABI or args are left
/// untouched.
pub fn add_event_addresses(log: &mut DecodedLog) {
    if let (Some(abi), Some(args)) = (&log.abi, &log.args) {
        log.addresses = Some(event_addresses(abi, args));
    }
}

fn value_address(value: &NormalizedValue) -> Option<String> {
    match value {
        NormalizedValue::Address(a) => Some(a.clone()),
        NormalizedValue::Str(s) if is_hex_address(s) => Some(s.clone()),
        NormalizedValue::Bytes(b) if b.len() == 20 => Some(format!("0x{}", hex::encode(b))),
        _ => None,
    }
}

fn value_hex(value: &NormalizedValue) -> Option<String> {
    match value {
        NormalizedValue::Bytes(b) => Some(hex::encode(b)),
        NormalizedValue::Str(s) => Some(s.strip_prefix("0x").unwrap_or(s).to_owned()),
        _ => None,
    }
}

fn is_hex_address(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|h| h.len() == 40 && h.chars().all(|c| c.is_ascii_hexdigit()))
}

fn split_packed(hex_str: &str) -> Vec<String> {
    hex_str
        .as_bytes()
        .chunks(40)
        .filter(|chunk| chunk.len() == 40)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .map(|chunk| format!("0x{chunk}"))
        .collect()
}
