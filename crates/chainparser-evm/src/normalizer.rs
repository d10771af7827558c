//! Converts alloy-core `DynSolValue` → ChainParser `NormalizedValue`.

use alloy_core::dyn_abi::DynSolValue;
use chainparser_core::types::NormalizedValue;

/// Convert a decoded `DynSolValue` into a `NormalizedValue`.
pub fn normalize(val: DynSolValue) -> NormalizedValue {
    match val {
        DynSolValue::Bool(b) => NormalizedValue::Bool(b),

        DynSolValue::Int(i, _bits) => match i128::try_from(i) {
            Ok(v) => NormalizedValue::Int(v),
            Err(_) => NormalizedValue::BigInt(i.to_string()),
        },

        DynSolValue::Uint(u, _bits) => match u128::try_from(u) {
            Ok(v) => NormalizedValue::Uint(v),
            Err(_) => NormalizedValue::BigUint(u.to_string()),
        },

        // bytesN is right-padded to 32 bytes; keep only the declared width
        DynSolValue::FixedBytes(word, size) => NormalizedValue::Bytes(word[..size.min(32)].to_vec()),

        DynSolValue::Bytes(b) => NormalizedValue::Bytes(b),

        DynSolValue::String(s) => NormalizedValue::Str(s),

        DynSolValue::Address(a) => NormalizedValue::address(a.as_slice()),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            NormalizedValue::Array(vals.into_iter().map(normalize).collect())
        }

        DynSolValue::Tuple(fields) => {
            NormalizedValue::Tuple(fields.into_iter().map(normalize).collect())
        }

        DynSolValue::Function(f) => NormalizedValue::Bytes(f.to_vec()),

        #[allow(unreachable_patterns)]
        _ => NormalizedValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, I256, U256};

    #[test]
    fn normalize_bool() {
        assert_eq!(normalize(DynSolValue::Bool(true)), NormalizedValue::Bool(true));
    }

    #[test]
    fn normalize_uint256_small() {
        let v = normalize(DynSolValue::Uint(U256::from(42u64), 256));
        assert_eq!(v, NormalizedValue::Uint(42));
    }

    #[test]
    fn normalize_uint256_large() {
        let v = normalize(DynSolValue::Uint(U256::MAX, 256));
        assert!(matches!(v, NormalizedValue::BigUint(_)));
    }

    #[test]
    fn normalize_negative_int() {
        let v = normalize(DynSolValue::Int(I256::try_from(-5i64).unwrap(), 256));
        assert_eq!(v, NormalizedValue::Int(-5));
    }

    #[test]
    fn address_is_lowercase() {
        let addr: Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        assert_eq!(
            normalize(DynSolValue::Address(addr)),
            NormalizedValue::Address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045".into())
        );
    }

    #[test]
    fn fixed_bytes_keep_declared_width() {
        let mut word = [0u8; 32];
        word[..4].copy_from_slice(&[0x01, 0xff, 0xc9, 0xa7]);
        let v = normalize(DynSolValue::FixedBytes(B256::from(word), 4));
        assert_eq!(v, NormalizedValue::Bytes(vec![0x01, 0xff, 0xc9, 0xa7]));
    }
}
