//! # chainparser-evm
//!
//! Contract analysis for any EVM-compatible chain:
//!
//! - bytecode fingerprinting against an ABI's selectors
//! - proxy detection through the UUPS, ERC1967 and OpenZeppelin slots
//! - standard (Solidity) event decoding with alloy `dyn-abi`
//! - contract calls and block-height binary search
//!
//! Everything that touches the chain goes through
//! [`chainparser_core::NodeClient`].

pub mod addresses;
pub mod contract;
pub mod decoder;
pub mod fingerprint;
pub mod normalizer;
pub mod proxy;
pub mod search;

pub use addresses::{add_event_addresses, event_addresses};
pub use contract::Contract;
pub use decoder::EventDecoder;
pub use fingerprint::{match_methods, selectors_from_abi};
pub use proxy::{ProxyResolution, ProxyResolver, ProxyType};
pub use search::{binary_search_number, BcSearch, Deployment, DeploymentQuery};

use chainparser_core::{abi::parse_abi, AbiFragment, ConfigError};

const DEFAULT_ABI_JSON: &str = include_str!("../abis/default.json");

/// The bundled ABI: ERC20, ERC677, ERC165, ERC721 families plus common
/// proxy and ownership methods.
pub fn default_abi() -> Result<Vec<AbiFragment>, ConfigError> {
    parse_abi(DEFAULT_ABI_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_abi_parses() {
        let abi = default_abi().unwrap();
        assert!(abi.iter().any(|f| f.name() == Some("transferAndCall")));
        assert!(abi.iter().any(|f| f.is_event() && f.name() == Some("Transfer")));
    }
}
