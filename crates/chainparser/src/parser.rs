//! `ContractParser`: contract inspection and log decoding.
//!
//! ```text
//! get_contract_details(address, block)
//!   native address?    → fixed method list
//!   proxy slot set?    → fingerprint implementation, prepend ERC1822 / ERC1967
//!   otherwise          → fingerprint address
//!
//! decode_logs(logs)
//!   per log: DecoderKind::Native  (bridge, remasc)  → release ABI, then legacy
//!            DecoderKind::Standard (everything else) → configured ABI
//! ```

use std::sync::Arc;

use chainparser_core::{
    interfaces::interfaces_by_methods,
    signature::{dedupe_events, SignatureData, SignatureTable},
    AbiFragment, BlockTag, ConfigError, DecodedLog, Network, NodeClient, NormalizedValue,
    ParserConfig, ParserError, RawLog,
};
use chainparser_evm::{
    add_event_addresses, default_abi, match_methods, selectors_from_abi, BcSearch, Contract,
    EventDecoder, ProxyResolver,
};
use chainparser_native::{NativeContracts, NativeDecoder};
use indexmap::IndexMap;

use crate::details::{ContractDetails, MethodsAndInterfaces};
use crate::token::{TokenData, DEFAULT_TOKEN_METHODS};

/// Decoder chosen for one log.
#[derive(Debug, Clone, Copy)]
pub enum DecoderKind<'a> {
    Standard(&'a EventDecoder),
    Native(&'a NativeDecoder),
}

impl DecoderKind<'_> {
    pub fn decode(&self, log: RawLog) -> DecodedLog {
        match self {
            DecoderKind::Standard(decoder) => decoder.decode_log(log),
            DecoderKind::Native(decoder) => decoder.decode_log(log),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, DecoderKind::Native(_))
    }
}

/// Entry point for contract inspection and log decoding.
pub struct ContractParser {
    abi: Vec<AbiFragment>,
    table: SignatureTable,
    standard: EventDecoder,
    natives: NativeContracts,
    network: Option<Network>,
    native_decoder: Option<NativeDecoder>,
    proxy: ProxyResolver,
    node: Arc<dyn NodeClient>,
}

impl std::fmt::Debug for ContractParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractParser")
            .field("abi_fragments", &self.abi.len())
            .field("network", &self.network)
            .field("natives", &self.natives)
            .finish()
    }
}

impl ContractParser {
    /// Build a parser. Fails on a net id that is unknown or has no bridge
    /// release table, and on malformed native contract addresses.
    pub fn new(config: ParserConfig, node: Arc<dyn NodeClient>) -> Result<Self, ConfigError> {
        let network = config.network()?;
        let native_decoder = network.map(NativeDecoder::new).transpose()?;
        let natives = NativeContracts::from_config(&config.native_contracts);
        natives.validate()?;

        let abi = match config.abi {
            Some(abi) => abi,
            None => default_abi()?,
        };
        let (abi, table) = load_abi(abi);
        let standard = EventDecoder::with_table(&abi, &table);

        tracing::debug!(
            network = ?network,
            fragments = abi.len(),
            events = standard.len(),
            "contract parser ready"
        );

        Ok(Self {
            abi,
            table,
            standard,
            natives,
            network,
            native_decoder,
            proxy: ProxyResolver::new(node.clone()),
            node,
        })
    }

    pub fn abi(&self) -> &[AbiFragment] {
        &self.abi
    }

    pub fn network(&self) -> Option<Network> {
        self.network
    }

    pub fn node(&self) -> &Arc<dyn NodeClient> {
        &self.node
    }

    /// Replace the ABI; `None` restores the bundled default.
    pub fn set_abi(&mut self, abi: Option<Vec<AbiFragment>>) -> Result<(), ConfigError> {
        let abi = match abi {
            Some(abi) => abi,
            None => default_abi()?,
        };
        let (abi, table) = load_abi(abi);
        self.standard = EventDecoder::with_table(&abi, &table);
        self.abi = abi;
        self.table = table;
        Ok(())
    }

    /// Function fragments of `abi`.
    pub fn get_methods_from_abi(abi: &[AbiFragment]) -> Vec<&AbiFragment> {
        abi.iter().filter(|f| f.is_function()).collect()
    }

    /// Canonical signature → signature data for every function of the ABI.
    pub fn get_abi_methods(&self) -> IndexMap<String, SignatureData> {
        Self::get_methods_from_abi(&self.abi)
            .into_iter()
            .filter_map(|f| {
                let data = self.table.get_or_compute(f);
                data.method.clone().map(|m| (m, data))
            })
            .collect()
    }

    /// Canonical signature → 4-byte selector hex.
    pub fn get_methods_selectors(&self) -> IndexMap<String, String> {
        selectors_from_abi(&self.abi, &self.table)
    }

    pub fn get_methods_from_contract_bytecode(&self, bytecode: Option<&str>) -> Vec<String> {
        match_methods(bytecode, &self.get_methods_selectors())
    }

    pub fn get_native_contract_address(&self, name: &str) -> Option<&str> {
        self.natives.address_of(name)
    }

    pub fn native_contracts(&self) -> &NativeContracts {
        &self.natives
    }

    pub async fn get_contract_code(&self, address: &str, block: BlockTag) -> Result<String, ParserError> {
        Ok(self.node.get_code(address, block).await?)
    }

    /// Fingerprint the code at `address` against the configured ABI.
    pub async fn get_contract_methods_and_erc_interfaces(
        &self,
        address: &str,
        block: BlockTag,
    ) -> Result<MethodsAndInterfaces, ParserError> {
        let code = self.get_contract_code(address, block).await?;
        let methods = self.get_methods_from_contract_bytecode(Some(&code));
        let interfaces = interfaces_by_methods(&methods);
        Ok(MethodsAndInterfaces {
            methods,
            interfaces,
        })
    }

    /// Methods, interfaces and proxy information of a contract.
    pub async fn get_contract_details(
        &self,
        address: &str,
        block: BlockTag,
    ) -> Result<ContractDetails, ParserError> {
        if self.natives.is_native(address) {
            let network = self.network.unwrap_or(Network::Mainnet);
            let mut details = ContractDetails::new(address);
            details.methods = self.natives.methods(address, network)?;
            return Ok(details);
        }

        self.inspect(address, block).await.map_err(|e| {
            tracing::error!(address, error = %e, "error getting contract details");
            e
        })
    }

    async fn inspect(&self, address: &str, block: BlockTag) -> Result<ContractDetails, ParserError> {
        let resolution = self.proxy.resolve(address, block).await?;
        if !resolution.is_proxy {
            let found = self.get_contract_methods_and_erc_interfaces(address, block).await?;
            return Ok(ContractDetails::new(address).with_fingerprint(found));
        }

        let details = ContractDetails::from(resolution);
        let Some(implementation) = details.implementation_address.clone() else {
            return Ok(details);
        };
        tracing::debug!(
            address,
            implementation = %implementation,
            proxy_type = ?details.proxy_type,
            "fingerprinting proxy implementation"
        );
        let found = self
            .get_contract_methods_and_erc_interfaces(&implementation, block)
            .await?;
        Ok(details.with_fingerprint(found))
    }

    pub fn proxy_resolver(&self) -> &ProxyResolver {
        &self.proxy
    }

    /// The decoder for a log, by its emitting address.
    pub fn decoder_for(&self, log: &RawLog) -> Result<DecoderKind<'_>, ConfigError> {
        let native = self
            .native_decoder
            .as_ref()
            .ok_or(ConfigError::NativeDecoderMissing)?;
        if self.natives.is_native(&log.address) {
            Ok(DecoderKind::Native(native))
        } else {
            Ok(DecoderKind::Standard(&self.standard))
        }
    }

    /// Decode a batch. Output has the input's length and order; logs that
    /// do not decode come back raw. Requires a configured network.
    pub fn decode_logs(&self, logs: &[RawLog]) -> Result<Vec<DecodedLog>, ConfigError> {
        if self.native_decoder.is_none() {
            return Err(ConfigError::NativeDecoderMissing);
        }
        logs.iter()
            .map(|log| Ok(self.decoder_for(log)?.decode(log.clone())))
            .collect()
    }

    /// [`Self::decode_logs`] plus `_addresses` on every decoded log.
    pub fn parse_tx_logs(&self, logs: &[RawLog]) -> Result<Vec<DecodedLog>, ConfigError> {
        let mut decoded = self.decode_logs(logs)?;
        decoded.iter_mut().for_each(|log| self.add_event_addresses(log));
        Ok(decoded)
    }

    pub fn add_event_addresses(&self, log: &mut DecodedLog) {
        add_event_addresses(log);
    }

    /// A [`Contract`] over the configured ABI.
    pub fn make_contract(&self, address: &str) -> Contract {
        Contract::new(self.abi.clone(), address, self.node.clone())
    }

    /// Best-effort call: failures are logged and yield `None`.
    pub async fn call(
        &self,
        contract: &Contract,
        method: &str,
        params: &[String],
        block: BlockTag,
    ) -> Option<NormalizedValue> {
        match contract.call(method, params, block).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(address = contract.address(), method, error = %e, "contract call failed");
                None
            }
        }
    }

    /// [`DEFAULT_TOKEN_METHODS`], fetched concurrently.
    pub async fn get_default_token_data(&self, contract: &Contract, block: BlockTag) -> TokenData {
        let calls = DEFAULT_TOKEN_METHODS
            .iter()
            .map(|method| self.call(contract, method, &[], block));
        TokenData::from_results(futures::future::join_all(calls).await)
    }

    /// Chain search helpers over the same node.
    pub fn bc_search(&self) -> BcSearch {
        BcSearch::new(self.node.clone())
    }
}

/// Annotate an ABI and drop events that repeat an indexed layout.
fn load_abi(abi: Vec<AbiFragment>) -> (Vec<AbiFragment>, SignatureTable) {
    let table = SignatureTable::from_abi(&abi);
    let abi = dedupe_events(&abi, &table);
    (abi, table)
}
