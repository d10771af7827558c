//! Public RSK nodes.
//!
//! Free, no-key endpoints run by RootstockLabs. Rate limits are low; use a
//! private node for bulk work.

use std::time::Duration;

use chainparser_core::Network;

use crate::client::RpcNodeClient;
use crate::error::TransportError;
use crate::retry::RetryConfig;
use crate::transport::HttpTransport;

pub fn public_node_url(network: Network) -> Option<&'static str> {
    match network {
        Network::Mainnet => Some("https://public-node.rsk.co"),
        Network::Testnet => Some("https://public-node.testnet.rsk.co"),
        Network::Regtest => None,
    }
}

fn conservative_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 5,
        initial_backoff: Duration::from_millis(500),
        max_backoff: Duration::from_secs(30),
        multiplier: 2.0,
    }
}

/// Client for the public node of `network` with a patient retry policy.
pub fn public_client(network: Network) -> Result<RpcNodeClient<HttpTransport>, TransportError> {
    let url = public_node_url(network)
        .ok_or_else(|| TransportError::Setup(format!("no public node for {network}")))?;
    let transport = HttpTransport::new(url, conservative_retry(), Duration::from_secs(30))?;
    Ok(RpcNodeClient::new(transport))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_url() {
        assert_eq!(public_node_url(Network::Mainnet), Some("https://public-node.rsk.co"));
    }

    #[test]
    fn regtest_has_no_public_node() {
        assert!(matches!(
            public_client(Network::Regtest),
            Err(TransportError::Setup(_))
        ));
    }
}
