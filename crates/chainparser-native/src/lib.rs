//! # chainparser-native
//!
//! Support for the RSK native contracts (bridge, remasc):
//!
//! - the bridge ABI of every network upgrade, selected by block height
//! - decoding of bridge logs, both Solidity-format and the legacy
//!   ASCII-topic / RLP-data format
//! - the native contract address registry

pub mod decoder;
pub mod legacy;
pub mod registry;
pub mod releases;

pub use decoder::NativeDecoder;
pub use legacy::{LegacyDecoder, ValueFilter};
pub use registry::NativeContracts;
pub use releases::{
    latest_bridge_methods, releases, resolve_release, resolve_release_str, ReleaseHeight,
    RskRelease,
};
