//! Ethereum ABI JSON model.
//!
//! Fragments are kept close to the JSON wire shape so they can be echoed back
//! in decoded output. Derived data (signatures, selectors) lives in
//! [`crate::signature::SignatureTable`], never on the fragment itself.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The `type` field of an ABI fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    #[default]
    Function,
    Event,
    Constructor,
    Fallback,
    Receive,
    Error,
}

/// One input or output parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            components: Vec::new(),
            indexed: None,
            internal_type: None,
        }
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = Some(indexed);
        self
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed == Some(true)
    }
}

/// A single ABI entry (function, event, constructor, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbiFragment {
    #[serde(rename = "type", default)]
    pub kind: FragmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<AbiParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

impl AbiFragment {
    pub fn function(name: impl Into<String>, inputs: Vec<AbiParam>, outputs: Vec<AbiParam>) -> Self {
        Self {
            kind: FragmentKind::Function,
            name: Some(name.into()),
            inputs,
            outputs,
            anonymous: None,
            state_mutability: None,
            constant: None,
            payable: None,
        }
    }

    pub fn event(name: impl Into<String>, inputs: Vec<AbiParam>) -> Self {
        Self {
            kind: FragmentKind::Event,
            name: Some(name.into()),
            inputs,
            outputs: Vec::new(),
            anonymous: Some(false),
            state_mutability: None,
            constant: None,
            payable: None,
        }
    }

    /// The fragment name, treating an empty string as absent.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn is_event(&self) -> bool {
        self.kind == FragmentKind::Event
    }

    pub fn is_function(&self) -> bool {
        self.kind == FragmentKind::Function
    }

    /// Number of inputs flagged `indexed: true`.
    pub fn indexed_count(&self) -> usize {
        self.inputs.iter().filter(|i| i.is_indexed()).count()
    }
}

/// Parse an ABI JSON array.
pub fn parse_abi(json: &str) -> Result<Vec<AbiFragment>, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::InvalidAbi {
        reason: e.to_string(),
    })
}

/// Convert an already-parsed JSON value into fragments.
pub fn abi_from_value(value: serde_json::Value) -> Result<Vec<AbiFragment>, ConfigError> {
    if !value.is_array() {
        return Err(ConfigError::InvalidAbi {
            reason: "ABI must be a JSON array".into(),
        });
    }
    serde_json::from_value(value).map_err(|e| ConfigError::InvalidAbi {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER: &str = r#"[{
        "anonymous": false,
        "inputs": [
            {"indexed": true, "name": "from", "type": "address"},
            {"indexed": true, "name": "to", "type": "address"},
            {"indexed": false, "name": "value", "type": "uint256"}
        ],
        "name": "Transfer",
        "type": "event"
    }]"#;

    #[test]
    fn parses_event_fragment() {
        let abi = parse_abi(TRANSFER).unwrap();
        assert_eq!(abi.len(), 1);
        assert!(abi[0].is_event());
        assert_eq!(abi[0].name(), Some("Transfer"));
        assert_eq!(abi[0].indexed_count(), 2);
    }

    #[test]
    fn missing_type_defaults_to_function() {
        let abi = parse_abi(r#"[{"name": "totalSupply", "inputs": []}]"#).unwrap();
        assert!(abi[0].is_function());
    }

    #[test]
    fn empty_name_is_absent() {
        let abi = parse_abi(r#"[{"type": "fallback", "name": ""}]"#).unwrap();
        assert_eq!(abi[0].name(), None);
    }

    #[test]
    fn non_array_is_rejected() {
        let err = abi_from_value(serde_json::json!({"type": "event"})).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAbi { .. }));
    }
}
