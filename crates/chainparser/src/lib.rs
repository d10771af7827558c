//! # chainparser
//!
//! Infer what a deployed contract is and decode what it logged.
//!
//! ```no_run
//! # async fn run(node: std::sync::Arc<dyn chainparser::NodeClient>) -> Result<(), chainparser::ParserError> {
//! use chainparser::{BlockTag, ContractParser, Network, ParserConfig};
//!
//! let parser = ContractParser::new(ParserConfig::for_network(Network::Testnet), node)?;
//! let details = parser
//!     .get_contract_details("0x19f64674d8a5b4e652319f5e239efd3bc969a1fe", BlockTag::Latest)
//!     .await?;
//! println!("{:?} {:?}", details.proxy_type, details.interfaces);
//! # Ok(())
//! # }
//! ```

pub mod details;
pub mod parser;
pub mod token;

pub use details::{ContractDetails, MethodsAndInterfaces};
pub use parser::{ContractParser, DecoderKind};
pub use token::{TokenData, DEFAULT_TOKEN_METHODS};

pub use chainparser_core::{
    AbiFragment, BlockTag, ConfigError, DecodeError, DecodedLog, Network, NodeClient, NodeError,
    NormalizedValue, ParserConfig, ParserError, RawLog,
};
pub use chainparser_evm::{
    BcSearch, Contract, Deployment, DeploymentQuery, ProxyResolution, ProxyType,
};
pub use chainparser_native::{resolve_release, ReleaseHeight, RskRelease};
