//! Call a contract through the node using an ABI.
//!
//! Call data is `selector ++ abi_encode_params(inputs)`; return data is
//! decoded against the function outputs. A single output is returned
//! unwrapped, several outputs come back as a tuple.

use std::sync::Arc;

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use chainparser_core::{
    error::decode_hex,
    signature::{canonical_signature, canonical_type, method_selector},
    AbiFragment, AbiParam, BlockTag, DecodeError, NodeClient, NormalizedValue, ParserError,
};

use crate::normalizer;

/// A contract bound to an address and a node.
#[derive(Clone)]
pub struct Contract {
    abi: Vec<AbiFragment>,
    address: String,
    node: Arc<dyn NodeClient>,
}

impl std::fmt::Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("functions", &self.abi.iter().filter(|a| a.is_function()).count())
            .finish()
    }
}

impl Contract {
    pub fn new(abi: Vec<AbiFragment>, address: impl Into<String>, node: Arc<dyn NodeClient>) -> Self {
        Self {
            abi,
            address: address.into(),
            node,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn abi(&self) -> &[AbiFragment] {
        &self.abi
    }

    /// Find a function by bare name (first match) or by canonical signature.
    pub fn function(&self, method: &str) -> Result<&AbiFragment, DecodeError> {
        let by_signature = method.contains('(');
        self.abi
            .iter()
            .filter(|f| f.is_function())
            .find(|f| {
                if by_signature {
                    canonical_signature(f).as_deref() == Some(method)
                } else {
                    f.name() == Some(method)
                }
            })
            .ok_or_else(|| DecodeError::UnknownFunction {
                name: method.to_string(),
            })
    }

    /// Encode call data. `params` are parsed against the input types, e.g.
    /// `"0xabc..."` for an address or `"1000"` for a uint.
    pub fn encode_call(&self, method: &str, params: &[String]) -> Result<Vec<u8>, DecodeError> {
        let func = self.function(method)?;
        if params.len() != func.inputs.len() {
            return Err(DecodeError::AbiEncodeFailed {
                reason: format!(
                    "{method} expects {} params, got {}",
                    func.inputs.len(),
                    params.len()
                ),
            });
        }

        let mut values = Vec::with_capacity(params.len());
        for (input, raw) in func.inputs.iter().zip(params) {
            let ty = resolve(input)?;
            let value = ty.coerce_str(raw).map_err(|e| DecodeError::AbiEncodeFailed {
                reason: format!("param '{}': {e}", input.name),
            })?;
            values.push(value);
        }

        let signature = canonical_signature(func).ok_or_else(|| DecodeError::UnknownFunction {
            name: method.to_string(),
        })?;
        let mut calldata = decode_hex(&method_selector(&signature))?;
        calldata.extend(DynSolValue::Tuple(values).abi_encode_params());
        Ok(calldata)
    }

    /// Decode the return data of `method`.
    pub fn decode_call(&self, method: &str, data: &[u8]) -> Result<NormalizedValue, DecodeError> {
        let func = self.function(method)?;
        if func.outputs.is_empty() {
            return Ok(NormalizedValue::Null);
        }
        let types = func
            .outputs
            .iter()
            .map(resolve)
            .collect::<Result<Vec<_>, _>>()?;
        let decoded = DynSolType::Tuple(types)
            .abi_decode_params(data)
            .map_err(|e| DecodeError::AbiDecodeFailed {
                reason: format!("{method} output: {e}"),
            })?;
        let mut values = match decoded {
            DynSolValue::Tuple(vals) => vals,
            other => vec![other],
        };
        if values.len() == 1 {
            Ok(normalizer::normalize(values.remove(0)))
        } else {
            Ok(NormalizedValue::Tuple(
                values.into_iter().map(normalizer::normalize).collect(),
            ))
        }
    }

    /// `eth_call` the method at `block` and decode the result.
    pub async fn call(
        &self,
        method: &str,
        params: &[String],
        block: BlockTag,
    ) -> Result<NormalizedValue, ParserError> {
        let calldata = self.encode_call(method, params)?;
        let data = format!("0x{}", hex::encode(&calldata));
        let raw = self.node.call(&self.address, &data, block).await?;
        let bytes = decode_hex(&raw)?;
        Ok(self.decode_call(method, &bytes)?)
    }
}

fn resolve(param: &AbiParam) -> Result<DynSolType, DecodeError> {
    let canonical = canonical_type(param);
    DynSolType::parse(&canonical).map_err(|e| DecodeError::AbiDecodeFailed {
        reason: format!("type '{canonical}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_abi;
    use async_trait::async_trait;
    use chainparser_core::NodeError;

    struct EchoNode {
        reply: String,
    }

    #[async_trait]
    impl NodeClient for EchoNode {
        async fn get_code(&self, _: &str, _: BlockTag) -> Result<String, NodeError> {
            Ok("0x".into())
        }
        async fn get_storage_at(&self, _: &str, _: &str, _: BlockTag) -> Result<String, NodeError> {
            Ok("0x".into())
        }
        async fn call(&self, _: &str, data: &str, _: BlockTag) -> Result<String, NodeError> {
            assert!(data.starts_with("0x"));
            Ok(self.reply.clone())
        }
    }

    fn contract(reply: &str) -> Contract {
        Contract::new(
            default_abi().unwrap(),
            "0x0000000000000000000000000000000000000001",
            Arc::new(EchoNode {
                reply: reply.into(),
            }),
        )
    }

    #[test]
    fn encode_transfer() {
        let c = contract("0x");
        let data = c
            .encode_call(
                "transfer",
                &[
                    "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".into(),
                    "1000".into(),
                ],
            )
            .unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(data[4 + 63], 0xe8);
    }

    #[test]
    fn overloads_resolve_by_signature() {
        let c = contract("0x");
        let f = c
            .function("safeTransferFrom(address,address,uint256,bytes)")
            .unwrap();
        assert_eq!(f.inputs.len(), 4);
        assert_eq!(c.function("safeTransferFrom").unwrap().inputs.len(), 3);
    }

    #[test]
    fn param_count_mismatch() {
        let c = contract("0x");
        assert!(matches!(
            c.encode_call("balanceOf", &[]),
            Err(DecodeError::AbiEncodeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn call_decodes_single_output() {
        // decimals() -> 18
        let reply = format!("0x{:064x}", 18);
        let value = contract(&reply).call("decimals", &[], BlockTag::Latest).await.unwrap();
        assert_eq!(value, NormalizedValue::Uint(18));
    }

    #[tokio::test]
    async fn call_decodes_string_output() {
        // name() -> "RIF"
        let reply = format!(
            "0x{:064x}{:064x}{}",
            32,
            3,
            format!("{:0<64}", hex::encode("RIF"))
        );
        let value = contract(&reply).call("name", &[], BlockTag::Latest).await.unwrap();
        assert_eq!(value, NormalizedValue::Str("RIF".into()));
    }

    #[tokio::test]
    async fn empty_return_data_fails() {
        let err = contract("0x").call("decimals", &[], BlockTag::Latest).await.unwrap_err();
        assert!(matches!(err, ParserError::Decode(DecodeError::AbiDecodeFailed { .. })));
    }
}
