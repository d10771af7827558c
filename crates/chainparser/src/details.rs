//! Output records of contract inspection.

use chainparser_evm::{ProxyResolution, ProxyType};
use serde::Serialize;

/// Methods detected in bytecode and the interfaces they complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodsAndInterfaces {
    pub methods: Vec<String>,
    pub interfaces: Vec<String>,
}

/// Everything known about a contract at one height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
    pub address: String,
    pub is_proxy: bool,
    pub implementation_address: Option<String>,
    pub beacon_address: Option<String>,
    pub proxy_type: Option<ProxyType>,
    pub methods: Vec<String>,
    pub interfaces: Vec<String>,
}

impl ContractDetails {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            is_proxy: false,
            implementation_address: None,
            beacon_address: None,
            proxy_type: None,
            methods: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    /// Fill methods and interfaces from a fingerprint, prepending the proxy
    /// marker interface when the proxy type has one.
    pub(crate) fn with_fingerprint(mut self, found: MethodsAndInterfaces) -> Self {
        self.methods = found.methods;
        self.interfaces = match self.proxy_type.and_then(|t| t.interface_marker()) {
            Some(marker) => {
                let mut merged = vec![marker.to_string()];
                merged.extend(found.interfaces.into_iter().filter(|i| i != marker));
                merged
            }
            None => found.interfaces,
        };
        self
    }
}

impl From<ProxyResolution> for ContractDetails {
    fn from(res: ProxyResolution) -> Self {
        Self {
            address: res.address,
            is_proxy: res.is_proxy,
            implementation_address: res.implementation_address,
            beacon_address: res.beacon_address,
            proxy_type: res.proxy_type,
            methods: Vec::new(),
            interfaces: Vec::new(),
        }
    }
}
