//! # chainparser-core
//!
//! Shared primitives for the ChainParser crates: the ABI JSON model, the
//! signature codec, the static ERC interface registry, the log data model and
//! the `NodeClient` collaborator trait every remote read goes through.
//!
//! Nothing in this crate performs I/O.

pub mod abi;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod log;
pub mod network;
pub mod node;
pub mod signature;
pub mod types;

pub use abi::{AbiFragment, AbiParam, FragmentKind};
pub use config::{NativeContractsConfig, NetConfig, ParserConfig};
pub use error::{ConfigError, DecodeError, NodeError, ParserError};
pub use interfaces::{interfaces_implemented_by, map_interfaces_to_ercs, InterfaceDefinition};
pub use log::{DecodedLog, RawLog};
pub use network::Network;
pub use node::{BlockTag, NodeClient};
pub use signature::{keccak256, keccak256_hex, SignatureData, SignatureTable};
pub use types::NormalizedValue;
