//! Proxy detection through well-known storage slots.
//!
//! | Pattern | Slot |
//! |---------|------|
//! | ERC1822 UUPS | `keccak256("PROXIABLE")` |
//! | ERC1967 logic | `keccak256("eip1967.proxy.implementation") - 1` |
//! | ERC1967 beacon | `keccak256("eip1967.proxy.beacon") - 1`, then `implementation()` on the beacon |
//! | OpenZeppelin unstructured storage (pre ERC1967) | `keccak256("org.zeppelinos.proxy.implementation")` |
//!
//! Slots are checked in the order above and the first non-zero slot wins.
//! Resolution goes one level deep: an implementation that is itself a proxy
//! is not followed.

use std::sync::Arc;

use chainparser_core::{AbiFragment, AbiParam, BlockTag, NodeClient, NormalizedValue, ParserError};
use serde::{Serialize, Serializer};

use crate::contract::Contract;

/// ERC1822 UUPS proxiable slot: `keccak256("PROXIABLE")`
pub const ERC1822_PROXIABLE_SLOT: &str =
    "0xc5f16f0fcc639fa48a6947836d9850f504798523bf8c9a3a87d5876cf622bcf7";

/// ERC1967 implementation slot
pub const ERC1967_IMPL_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// ERC1967 beacon slot
pub const ERC1967_BEACON_SLOT: &str =
    "0xa3f0ad74e5423aebfd80d3ef4346578335a9a72aeaee59ff6cb3582b35133d50";

/// OpenZeppelin unstructured storage implementation slot
pub const OZ_UNSTRUCTURED_IMPL_SLOT: &str =
    "0x7050c9e0f4ca769c69bd3a8ef740bc37934f8e2c036e5a723fd8ee048ed3f8c3";

/// The detected proxy pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    Erc1822Uups,
    Erc1967Normal,
    Erc1967Beacon,
    OzUnstructuredStorage,
}

impl ProxyType {
    pub fn description(&self) -> &'static str {
        match self {
            ProxyType::Erc1822Uups => "ERC1822 Universal Upgradeable Proxy Standard (UUPS)",
            ProxyType::Erc1967Normal => "ERC1967 Proxy Storage Slots - Normal",
            ProxyType::Erc1967Beacon => "ERC1967 Proxy Storage Slots - Beacon",
            ProxyType::OzUnstructuredStorage => {
                "Open Zeppelin's Unstructured Storage Proxy Pattern (pre ERC1967)"
            }
        }
    }

    pub fn slot(&self) -> &'static str {
        match self {
            ProxyType::Erc1822Uups => ERC1822_PROXIABLE_SLOT,
            ProxyType::Erc1967Normal => ERC1967_IMPL_SLOT,
            ProxyType::Erc1967Beacon => ERC1967_BEACON_SLOT,
            ProxyType::OzUnstructuredStorage => OZ_UNSTRUCTURED_IMPL_SLOT,
        }
    }

    /// Interface name prepended to the implementation's interfaces.
    pub fn interface_marker(&self) -> Option<&'static str> {
        match self {
            ProxyType::Erc1822Uups => Some("ERC1822"),
            ProxyType::Erc1967Normal | ProxyType::Erc1967Beacon => Some("ERC1967"),
            ProxyType::OzUnstructuredStorage => None,
        }
    }
}

impl std::fmt::Display for ProxyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

impl Serialize for ProxyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.description())
    }
}

/// Result of proxy detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResolution {
    pub address: String,
    pub is_proxy: bool,
    pub proxy_type: Option<ProxyType>,
    pub implementation_address: Option<String>,
    pub beacon_address: Option<String>,
}

impl ProxyResolution {
    pub fn not_a_proxy(address: &str) -> Self {
        Self {
            address: address.to_string(),
            is_proxy: false,
            proxy_type: None,
            implementation_address: None,
            beacon_address: None,
        }
    }

    fn found(address: &str, proxy_type: ProxyType, implementation: Option<String>) -> Self {
        Self {
            address: address.to_string(),
            is_proxy: true,
            proxy_type: Some(proxy_type),
            implementation_address: implementation,
            beacon_address: None,
        }
    }
}

/// True when `value` is `0x`-prefixed hex with a non-zero digit.
pub fn not_zero(value: &str) -> bool {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => hex.chars().all(|c| c.is_ascii_hexdigit()) && hex.chars().any(|c| c != '0'),
        None => false,
    }
}

/// The address held in the low 20 bytes of a storage word.
pub fn address_from_slot(slot_value: &str) -> String {
    let hex = slot_value.strip_prefix("0x").unwrap_or(slot_value);
    let tail = if hex.len() > 40 { &hex[hex.len() - 40..] } else { hex };
    format!("0x{:0>40}", tail.to_lowercase())
}

fn beacon_abi() -> Vec<AbiFragment> {
    vec![AbiFragment::function(
        "implementation",
        vec![],
        vec![AbiParam::new("", "address")],
    )]
}

/// Reads proxy slots through a node.
#[derive(Clone)]
pub struct ProxyResolver {
    node: Arc<dyn NodeClient>,
}

impl ProxyResolver {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Self { node }
    }

    /// Check every pattern in priority order.
    pub async fn resolve(&self, address: &str, block: BlockTag) -> Result<ProxyResolution, ParserError> {
        let uups = self.is_erc1822_proxy(address, block).await?;
        if uups.is_proxy {
            return Ok(uups);
        }
        let erc1967 = self.is_erc1967_proxy(address, block).await?;
        if erc1967.is_proxy {
            return Ok(erc1967);
        }
        self.is_oz_unstructured_storage_proxy(address, block).await
    }

    pub async fn is_erc1822_proxy(&self, address: &str, block: BlockTag) -> Result<ProxyResolution, ParserError> {
        self.check_slot(address, ProxyType::Erc1822Uups, block).await
    }

    /// Logic slot first, then the beacon slot.
    pub async fn is_erc1967_proxy(&self, address: &str, block: BlockTag) -> Result<ProxyResolution, ParserError> {
        let normal = self.check_slot(address, ProxyType::Erc1967Normal, block).await?;
        if normal.is_proxy {
            return Ok(normal);
        }

        let beacon_word = self.read_slot(address, ProxyType::Erc1967Beacon, block).await?;
        if !not_zero(&beacon_word) {
            return Ok(ProxyResolution::not_a_proxy(address));
        }

        let beacon = address_from_slot(&beacon_word);
        let implementation = self.beacon_implementation(address, &beacon, block).await?;
        let mut res = ProxyResolution::found(address, ProxyType::Erc1967Beacon, Some(implementation));
        res.beacon_address = Some(beacon);
        Ok(res)
    }

    pub async fn is_oz_unstructured_storage_proxy(
        &self,
        address: &str,
        block: BlockTag,
    ) -> Result<ProxyResolution, ParserError> {
        self.check_slot(address, ProxyType::OzUnstructuredStorage, block).await
    }

    async fn check_slot(
        &self,
        address: &str,
        proxy_type: ProxyType,
        block: BlockTag,
    ) -> Result<ProxyResolution, ParserError> {
        let word = self.read_slot(address, proxy_type, block).await?;
        if not_zero(&word) {
            Ok(ProxyResolution::found(address, proxy_type, Some(address_from_slot(&word))))
        } else {
            Ok(ProxyResolution::not_a_proxy(address))
        }
    }

    async fn read_slot(&self, address: &str, proxy_type: ProxyType, block: BlockTag) -> Result<String, ParserError> {
        tracing::trace!(address, slot = proxy_type.slot(), %block, "reading proxy slot");
        self.node
            .get_storage_at(address, proxy_type.slot(), block)
            .await
            .map_err(|e| {
                tracing::warn!(
                    address,
                    proxy_type = proxy_type.description(),
                    error = %e,
                    "error checking implementation slot"
                );
                ParserError::from(e)
            })
    }

    async fn beacon_implementation(&self, proxy: &str, beacon: &str, block: BlockTag) -> Result<String, ParserError> {
        let contract = Contract::new(beacon_abi(), beacon, self.node.clone());
        let outcome = contract.call("implementation", &[], block).await;
        let reason = match outcome {
            Ok(NormalizedValue::Address(addr)) => return Ok(addr),
            Ok(other) => format!("beacon returned a non-address value: {other}"),
            Err(e) => e.to_string(),
        };
        tracing::warn!(
            address = proxy,
            beacon,
            error = %reason,
            "error fetching implementation from beacon proxy"
        );
        Err(ParserError::BeaconResolution {
            beacon: beacon.to_string(),
            reason,
        })
    }
}
