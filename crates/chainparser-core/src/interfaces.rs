//! Static registry of ERC interfaces recognised from method signatures.
//!
//! An interface is implemented when every one of its required canonical
//! signatures is present in the observed method set. The registry is ordered,
//! and that order is preserved in every result.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::signature::erc165_id_from_methods;

/// One registry entry.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceDefinition {
    pub name: &'static str,
    pub methods: &'static [&'static str],
    /// XOR of the member selectors, `0x`-prefixed.
    pub erc165_id: String,
}

impl InterfaceDefinition {
    fn new(name: &'static str, methods: &'static [&'static str]) -> Self {
        Self {
            name,
            methods,
            erc165_id: erc165_id_from_methods(methods),
        }
    }

    /// True when `observed` contains every required signature.
    pub fn is_implemented_by<S: AsRef<str>>(&self, observed: &[S]) -> bool {
        self.methods
            .iter()
            .all(|m| observed.iter().any(|o| o.as_ref() == *m))
    }
}

const ERC20: &[&str] = &[
    "totalSupply()",
    "balanceOf(address)",
    "allowance(address,address)",
    "transfer(address,uint256)",
    "approve(address,uint256)",
    "transferFrom(address,address,uint256)",
];

const ERC677: &[&str] = &["transferAndCall(address,uint256,bytes)"];

const ERC165: &[&str] = &["supportsInterface(bytes4)"];

const ERC721: &[&str] = &[
    "balanceOf(address)",
    "ownerOf(uint256)",
    "approve(address,uint256)",
    "getApproved(uint256)",
    "setApprovalForAll(address,bool)",
    "isApprovedForAll(address,address)",
    "transferFrom(address,address,uint256)",
    "safeTransferFrom(address,address,uint256)",
    "safeTransferFrom(address,address,uint256,bytes)",
];

const ERC721_ENUMERABLE: &[&str] = &[
    "totalSupply()",
    "tokenOfOwnerByIndex(address,uint256)",
    "tokenByIndex(uint256)",
];

const ERC721_METADATA: &[&str] = &["name()", "symbol()", "tokenURI(uint256)"];

const ERC721_EXISTS: &[&str] = &["exists(uint256)"];

const ERC1822: &[&str] = &["proxiableUUID()"];

static REGISTRY: Lazy<Vec<InterfaceDefinition>> = Lazy::new(|| {
    vec![
        InterfaceDefinition::new("ERC20", ERC20),
        InterfaceDefinition::new("ERC677", ERC677),
        InterfaceDefinition::new("ERC165", ERC165),
        InterfaceDefinition::new("ERC721", ERC721),
        InterfaceDefinition::new("ERC721Enumerable", ERC721_ENUMERABLE),
        InterfaceDefinition::new("ERC721Metadata", ERC721_METADATA),
        InterfaceDefinition::new("ERC721Exists", ERC721_EXISTS),
        InterfaceDefinition::new("ERC1822", ERC1822),
    ]
});

/// Public ERC names. Keys missing here are reported unchanged.
const ERC_NAMES: &[(&str, &str)] = &[
    ("ERC20", "ERC20"),
    ("ERC677", "ERC677"),
    ("ERC165", "ERC165"),
    ("ERC721", "ERC721"),
    ("ERC1822", "ERC1822"),
    ("ERC1967", "ERC1967"),
];

/// The full registry, in order.
pub fn registry() -> &'static [InterfaceDefinition] {
    REGISTRY.as_slice()
}

/// Look up a registry entry by name.
pub fn interface(name: &str) -> Option<&'static InterfaceDefinition> {
    REGISTRY.iter().find(|d| d.name == name)
}

/// Map every registry interface to whether `observed` implements it.
pub fn interfaces_implemented_by<S: AsRef<str>>(observed: &[S]) -> IndexMap<&'static str, bool> {
    REGISTRY
        .iter()
        .map(|def| (def.name, def.is_implemented_by(observed)))
        .collect()
}

/// Project the `true` entries onto their public ERC names.
pub fn map_interfaces_to_ercs(flags: &IndexMap<&'static str, bool>) -> Vec<String> {
    flags
        .iter()
        .filter(|(_, implemented)| **implemented)
        .map(|(name, _)| erc_name(name).to_string())
        .collect()
}

/// Interfaces (by public name) implemented by a method set.
pub fn interfaces_by_methods<S: AsRef<str>>(methods: &[S]) -> Vec<String> {
    map_interfaces_to_ercs(&interfaces_implemented_by(methods))
}

fn erc_name(key: &str) -> &str {
    ERC_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}
