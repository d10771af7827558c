//! RSK networks and their numeric ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// An RSK network, named after the Bitcoin network it is merge-mined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Map an RSK network id (30, 31, 33).
    pub fn from_net_id(id: u64) -> Option<Self> {
        match id {
            30 => Some(Network::Mainnet),
            31 => Some(Network::Testnet),
            33 => Some(Network::Regtest),
            _ => None,
        }
    }

    pub fn net_id(&self) -> u64 {
        match self {
            Network::Mainnet => 30,
            Network::Testnet => 31,
            Network::Regtest => 33,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }

    /// Version byte of Bitcoin P2SH addresses on the paired network.
    pub fn btc_p2sh_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet | Network::Regtest => 0xc4,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "30" => Ok(Network::Mainnet),
            "testnet" | "31" => Ok(Network::Testnet),
            "regtest" | "33" => Ok(Network::Regtest),
            _ => Err(ConfigError::UnsupportedNetwork {
                network: s.to_string(),
            }),
        }
    }
}
