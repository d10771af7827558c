//! Node endpoint configuration.

use serde::Deserialize;
use std::time::Duration;

use chainparser_core::Network;

use crate::public::public_node_url;
use crate::retry::RetryConfig;

/// Environment variable consulted when no URL is configured.
pub const NODE_URL_ENV: &str = "RSK_NODE_URL";

/// Local RSKj default.
pub const DEFAULT_NODE_URL: &str = "http://localhost:4444";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub url: Option<String>,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Public RSK node of `network`, if there is one.
    pub fn public(network: Network) -> Option<Self> {
        public_node_url(network).map(Self::with_url)
    }

    /// Configured URL, then `RSK_NODE_URL`, then the local node.
    pub fn url(&self) -> String {
        self.url
            .clone()
            .or_else(|| std::env::var(NODE_URL_ENV).ok().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| DEFAULT_NODE_URL.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
