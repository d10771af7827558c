//! RSK network upgrades and the bridge ABI active during each.
//!
//! A release is active from its activation height up to, but not including,
//! the next release's height. The last release is open-ended.

use std::fmt;
use std::str::FromStr;

use chainparser_core::{abi::parse_abi, AbiFragment, ConfigError, Network};
use serde::Serialize;

/// One network upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RskRelease {
    pub name: &'static str,
    pub height: u64,
    #[serde(skip)]
    abi_json: &'static str,
}

impl RskRelease {
    const fn new(name: &'static str, height: u64, abi_json: &'static str) -> Self {
        Self {
            name,
            height,
            abi_json,
        }
    }

    /// The bridge ABI of this release.
    pub fn abi(&self) -> Result<Vec<AbiFragment>, ConfigError> {
        parse_abi(self.abi_json)
    }
}

const ORCHID: &str = include_str!("../abis/bridge-orchid.json");
const WASABI: &str = include_str!("../abis/bridge-wasabi.json");
const PAPYRUS: &str = include_str!("../abis/bridge-papyrus.json");
const IRIS: &str = include_str!("../abis/bridge-iris.json");
const HOP: &str = include_str!("../abis/bridge-hop.json");
const FINGERROOT: &str = include_str!("../abis/bridge-fingerroot.json");
const LOVELL: &str = include_str!("../abis/bridge-lovell.json");
const REED: &str = include_str!("../abis/bridge-reed.json");

static MAINNET: [RskRelease; 8] = [
    RskRelease::new("orchid", 0, ORCHID),
    RskRelease::new("wasabi", 1_591_000, WASABI),
    RskRelease::new("papyrus", 2_392_700, PAPYRUS),
    RskRelease::new("iris", 3_614_800, IRIS),
    RskRelease::new("hop", 4_598_500, HOP),
    RskRelease::new("fingerroot", 5_468_000, FINGERROOT),
    RskRelease::new("lovell", 7_338_024, LOVELL),
    RskRelease::new("reed", 8_052_200, REED),
];

static TESTNET: [RskRelease; 7] = [
    RskRelease::new("wasabi", 0, WASABI),
    RskRelease::new("papyrus", 863_000, PAPYRUS),
    RskRelease::new("iris", 2_060_500, IRIS),
    RskRelease::new("hop", 3_103_000, HOP),
    RskRelease::new("fingerroot", 4_015_800, FINGERROOT),
    RskRelease::new("lovell", 6_110_487, LOVELL),
    RskRelease::new("reed", 6_835_700, REED),
];

/// Release table of a network, ordered by activation height.
pub fn releases(network: Network) -> Result<&'static [RskRelease], ConfigError> {
    match network {
        Network::Mainnet => Ok(&MAINNET),
        Network::Testnet => Ok(&TESTNET),
        other => Err(ConfigError::UnsupportedNetwork {
            network: other.to_string(),
        }),
    }
}

/// Height argument of [`resolve_release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseHeight {
    #[default]
    Latest,
    Number(u64),
}

impl From<u64> for ReleaseHeight {
    fn from(n: u64) -> Self {
        ReleaseHeight::Number(n)
    }
}

/// A log without a block number resolves against the latest release.
impl From<Option<u64>> for ReleaseHeight {
    fn from(n: Option<u64>) -> Self {
        n.map_or(ReleaseHeight::Latest, ReleaseHeight::Number)
    }
}

impl fmt::Display for ReleaseHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseHeight::Latest => f.write_str("latest"),
            ReleaseHeight::Number(n) => write!(f, "{n}"),
        }
    }
}

/// `"latest"` or a decimal block number.
impl FromStr for ReleaseHeight {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            return Ok(ReleaseHeight::Latest);
        }
        s.parse::<u64>()
            .map(ReleaseHeight::Number)
            .map_err(|_| ConfigError::InvalidHeight {
                value: s.to_string(),
            })
    }
}

/// Heights arriving as JSON: a non-negative integer or `"latest"`.
impl TryFrom<&serde_json::Value> for ReleaseHeight {
    type Error = ConfigError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(s) if s == "latest" => Ok(ReleaseHeight::Latest),
            serde_json::Value::Number(n) => {
                n.as_u64()
                    .map(ReleaseHeight::Number)
                    .ok_or_else(|| ConfigError::InvalidHeight {
                        value: n.to_string(),
                    })
            }
            other => Err(ConfigError::InvalidHeight {
                value: other.to_string(),
            }),
        }
    }
}

/// The release active at `height` on `network`.
pub fn resolve_release(
    height: impl Into<ReleaseHeight>,
    network: Network,
) -> Result<&'static RskRelease, ConfigError> {
    let table = releases(network)?;
    let last = table.last().ok_or_else(|| ConfigError::UnsupportedNetwork {
        network: network.to_string(),
    })?;
    let height = match height.into() {
        ReleaseHeight::Latest => return Ok(last),
        ReleaseHeight::Number(n) => n,
    };
    // heights below the first activation belong to the first release
    let active = table.iter().rev().find(|r| height >= r.height).unwrap_or(&table[0]);
    Ok(active)
}

/// [`resolve_release`] over string inputs, as received from a CLI or config.
pub fn resolve_release_str(height: &str, network: &str) -> Result<&'static RskRelease, ConfigError> {
    let network: Network = network.parse()?;
    let height: ReleaseHeight = height.parse()?;
    resolve_release(height, network)
}

/// Canonical function signatures of the newest bridge release.
pub fn latest_bridge_methods(network: Network) -> Result<Vec<String>, ConfigError> {
    let release = resolve_release(ReleaseHeight::Latest, network)?;
    Ok(release
        .abi()?
        .iter()
        .filter(|f| f.is_function())
        .filter_map(chainparser_core::signature::canonical_signature)
        .collect())
}
