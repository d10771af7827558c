//! Parser configuration, loadable from YAML or JSON.
//!
//! ```yaml
//! nativeContracts:
//!   bridge: "0x0000000000000000000000000000000001000006"
//!   remasc: "0x0000000000000000000000000000000001000008"
//! net:
//!   id: 31
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::abi::AbiFragment;
use crate::error::ConfigError;
use crate::network::Network;

pub const BRIDGE_ADDRESS: &str = "0x0000000000000000000000000000000001000006";
pub const REMASC_ADDRESS: &str = "0x0000000000000000000000000000000001000008";

/// Addresses of the RSK native (precompiled) contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeContractsConfig {
    #[serde(default = "default_bridge")]
    pub bridge: String,
    #[serde(default = "default_remasc")]
    pub remasc: String,
}

fn default_bridge() -> String {
    BRIDGE_ADDRESS.into()
}

fn default_remasc() -> String {
    REMASC_ADDRESS.into()
}

impl Default for NativeContractsConfig {
    fn default() -> Self {
        Self {
            bridge: default_bridge(),
            remasc: default_remasc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetConfig {
    /// RSK network id: 30 mainnet, 31 testnet, 33 regtest.
    #[serde(deserialize_with = "de_net_id")]
    pub id: u64,
}

/// Accepts `31` or `"31"`.
fn de_net_id<'de, D: serde::Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Num(u64),
        Str(String),
    }
    match Id::deserialize(de)? {
        Id::Num(n) => Ok(n),
        Id::Str(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid net id '{s}'"))),
    }
}

/// Top-level parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    #[serde(default)]
    pub native_contracts: NativeContractsConfig,
    /// Required for log decoding.
    #[serde(default)]
    pub net: Option<NetConfig>,
    /// ABI used for fingerprinting and standard log decoding. The bundled
    /// default ABI is used when absent.
    #[serde(default)]
    pub abi: Option<Vec<AbiFragment>>,
}

impl ParserConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            net: Some(NetConfig {
                id: network.net_id(),
            }),
            ..Self::default()
        }
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Ok(serde_yaml::from_str(&text)?),
        }
    }

    /// The configured network, if any. Unknown ids are an error.
    pub fn network(&self) -> Result<Option<Network>, ConfigError> {
        match &self.net {
            None => Ok(None),
            Some(net) => Network::from_net_id(net.id).map(Some).ok_or_else(|| {
                ConfigError::UnsupportedNetwork {
                    network: net.id.to_string(),
                }
            }),
        }
    }
}
