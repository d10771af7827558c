//! Decoded argument values.
//!
//! Serialization is plain JSON rather than tagged: addresses and byte strings
//! become `0x` hex strings, integers become decimal strings (they routinely
//! exceed 2^53), tuples become arrays.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// A decoded, normalized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    Uint(u128),
    /// Large uints (> u128) stored as decimal string
    BigUint(String),
    Int(i128),
    /// Large ints (> i128) stored as decimal string
    BigInt(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    /// 20-byte address, lowercase hex with 0x prefix
    Address(String),
    Array(Vec<NormalizedValue>),
    Tuple(Vec<NormalizedValue>),
    Null,
}

impl NormalizedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, NormalizedValue::Null)
    }

    /// Empty byte strings, empty strings and nulls.
    pub fn is_empty(&self) -> bool {
        match self {
            NormalizedValue::Null => true,
            NormalizedValue::Bytes(b) => b.is_empty(),
            NormalizedValue::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            NormalizedValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            NormalizedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NormalizedValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn address(bytes: &[u8]) -> Self {
        NormalizedValue::Address(format!("0x{}", hex::encode(bytes)))
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Uint(v) => write!(f, "{v}"),
            NormalizedValue::BigUint(v) => write!(f, "{v}"),
            NormalizedValue::Int(v) => write!(f, "{v}"),
            NormalizedValue::BigInt(v) => write!(f, "{v}"),
            NormalizedValue::Bool(v) => write!(f, "{v}"),
            NormalizedValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            NormalizedValue::Str(s) => write!(f, "{s}"),
            NormalizedValue::Address(a) => write!(f, "{a}"),
            NormalizedValue::Array(v) | NormalizedValue::Tuple(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            NormalizedValue::Null => write!(f, "null"),
        }
    }
}

impl Serialize for NormalizedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NormalizedValue::Bool(b) => serializer.serialize_bool(*b),
            NormalizedValue::Null => serializer.serialize_none(),
            NormalizedValue::Array(items) | NormalizedValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_json() {
        let val = NormalizedValue::Array(vec![
            NormalizedValue::address(&[0xab; 20]),
            NormalizedValue::Uint(1_000_000_000_000_000_000),
            NormalizedValue::Bytes(vec![0xfe, 0xc0]),
            NormalizedValue::Bool(true),
            NormalizedValue::Null,
        ]);
        let json = serde_json::to_value(&val).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                format!("0x{}", "ab".repeat(20)),
                "1000000000000000000",
                "0xfec0",
                true,
                null
            ])
        );
    }

    #[test]
    fn emptiness() {
        assert!(NormalizedValue::Bytes(vec![]).is_empty());
        assert!(NormalizedValue::Str(String::new()).is_empty());
        assert!(!NormalizedValue::Bytes(vec![0]).is_empty());
        assert!(!NormalizedValue::Array(vec![]).is_empty());
    }
}
