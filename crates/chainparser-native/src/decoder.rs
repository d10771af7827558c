//! Bridge log decoding across releases.
//!
//! A log is first matched against the bridge ABI of the release active at
//! its block height. Solidity-format events (iris onwards) decode there;
//! anything the release ABI does not know falls through to the legacy
//! decoder.

use chainparser_core::{signature::SignatureTable, ConfigError, DecodedLog, Network, RawLog};
use chainparser_evm::EventDecoder;

use crate::legacy::LegacyDecoder;
use crate::releases::{releases, resolve_release, RskRelease};

/// Decoder for native contract logs on one network.
#[derive(Debug, Clone)]
pub struct NativeDecoder {
    network: Network,
    releases: Vec<(&'static RskRelease, EventDecoder)>,
    legacy: LegacyDecoder,
}

impl NativeDecoder {
    /// Build a decoder for every release of `network`. Fails for networks
    /// without a release table.
    pub fn new(network: Network) -> Result<Self, ConfigError> {
        let mut table = SignatureTable::new();
        let mut decoders = Vec::new();
        for release in releases(network)? {
            let abi = release.abi()?;
            // releases are cumulative; fragments seen before keep their entry
            table.annotate(&abi, true);
            decoders.push((release, EventDecoder::with_table(&abi, &table)));
        }
        tracing::debug!(%network, releases = decoders.len(), "native decoder ready");
        Ok(Self {
            network,
            releases: decoders,
            legacy: LegacyDecoder::new(network),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The release and its event decoder for a block height; `None` means
    /// latest.
    pub fn release_for(&self, height: Option<u64>) -> Result<&(&'static RskRelease, EventDecoder), ConfigError> {
        let release = resolve_release(height, self.network)?;
        self.releases
            .iter()
            .find(|(r, _)| r.name == release.name)
            .ok_or_else(|| ConfigError::UnsupportedNetwork {
                network: self.network.to_string(),
            })
    }

    pub fn legacy(&self) -> &LegacyDecoder {
        &self.legacy
    }

    /// Decode one native contract log. Never fails; unknown events come
    /// back undecoded.
    pub fn decode_log(&self, log: RawLog) -> DecodedLog {
        match self.release_for(log.block_number) {
            Ok((release, standard)) if standard.find_event(&log.topics).is_some() => {
                tracing::trace!(release = release.name, "decoding with release ABI");
                standard.decode_log(log)
            }
            Ok(_) => self.legacy.decode_log(log),
            Err(e) => {
                tracing::debug!(error = %e, "no release for log");
                self.legacy.decode_log(log)
            }
        }
    }
}
