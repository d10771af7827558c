//! Native (precompiled) contracts known by address.

use chainparser_core::{ConfigError, NativeContractsConfig, Network};
use indexmap::IndexMap;

use crate::releases::latest_bridge_methods;

pub const BRIDGE: &str = "bridge";
pub const REMASC: &str = "remasc";

/// Name ↔ address table of the native contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeContracts {
    by_name: IndexMap<&'static str, String>,
}

impl Default for NativeContracts {
    fn default() -> Self {
        Self::from_config(&NativeContractsConfig::default())
    }
}

impl NativeContracts {
    pub fn from_config(config: &NativeContractsConfig) -> Self {
        let mut by_name = IndexMap::new();
        by_name.insert(BRIDGE, config.bridge.to_lowercase());
        by_name.insert(REMASC, config.remasc.to_lowercase());
        Self { by_name }
    }

    /// Rejects entries that are not 20-byte hex addresses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for address in self.by_name.values() {
            let valid = address
                .strip_prefix("0x")
                .is_some_and(|h| h.len() == 40 && h.chars().all(|c| c.is_ascii_hexdigit()));
            if !valid {
                return Err(ConfigError::InvalidAddress {
                    value: address.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn address_of(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn name_of(&self, address: &str) -> Option<&'static str> {
        self.by_name
            .iter()
            .find(|(_, a)| a.eq_ignore_ascii_case(address))
            .map(|(name, _)| *name)
    }

    pub fn is_native(&self, address: &str) -> bool {
        self.name_of(address).is_some()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.by_name.values().map(String::as_str)
    }

    /// Fixed method list of a native contract: the newest bridge release's
    /// functions for the bridge, nothing for the rest.
    pub fn methods(&self, address: &str, network: Network) -> Result<Vec<String>, ConfigError> {
        match self.name_of(address) {
            Some(BRIDGE) => latest_bridge_methods(network),
            _ => Ok(Vec::new()),
        }
    }
}
