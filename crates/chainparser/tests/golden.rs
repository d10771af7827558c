//! Golden fixture integration tests.
//!
//! Each test loads a real RSK log from `fixtures/rsk/`, runs it through
//! `ContractParser::parse_tx_logs` and compares the decoded event, its
//! arguments and the extracted addresses with the values recorded in the
//! fixture JSON.

use std::sync::Arc;

use async_trait::async_trait;
use chainparser::{
    resolve_release, BlockTag, ContractParser, Network, NodeClient, NodeError, ParserConfig,
    RawLog,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Log decoding never touches the node.
struct OfflineNode;

#[async_trait]
impl NodeClient for OfflineNode {
    async fn get_code(&self, _: &str, _: BlockTag) -> Result<String, NodeError> {
        Err(NodeError::Transport("offline".into()))
    }
    async fn get_storage_at(&self, _: &str, _: &str, _: BlockTag) -> Result<String, NodeError> {
        Err(NodeError::Transport("offline".into()))
    }
    async fn call(&self, _: &str, _: &str, _: BlockTag) -> Result<String, NodeError> {
        Err(NodeError::Transport("offline".into()))
    }
}

/// The fixtures live two levels above the crate root.
fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/rsk");
    p.push(name);
    p
}

fn load_fixture(name: &str) -> serde_json::Value {
    let json = std::fs::read_to_string(fixture_path(name)).expect("fixture not found");
    serde_json::from_str(&json).unwrap()
}

fn network_of(fixture: &serde_json::Value) -> Network {
    fixture["network"].as_str().unwrap().parse().unwrap()
}

/// Decode the fixture's log and return it serialized, the way callers see it.
fn decode_fixture(fixture: &serde_json::Value) -> serde_json::Value {
    let parser = ContractParser::new(
        ParserConfig::for_network(network_of(fixture)),
        Arc::new(OfflineNode),
    )
    .unwrap();
    let log: RawLog = serde_json::from_value(fixture["log"].clone()).unwrap();
    let mut decoded = parser.parse_tx_logs(&[log]).unwrap();
    assert_eq!(decoded.len(), 1);
    serde_json::to_value(decoded.remove(0)).unwrap()
}

/// Compare every key of `expected` against the decoded log, and check the
/// raw log fields came through unchanged.
fn assert_matches_fixture(fixture: &serde_json::Value) {
    let decoded = decode_fixture(fixture);
    let expected = fixture["expected"].as_object().unwrap();

    for (key, want) in expected {
        assert_eq!(&decoded[key], want, "{key} mismatch");
    }
    for (key, want) in fixture["log"].as_object().unwrap() {
        assert_eq!(&decoded[key], want, "raw field {key} changed");
    }
}

/// The release named by the fixture must be the one active at its height.
fn assert_release(fixture: &serde_json::Value) {
    let Some(name) = fixture["release"].as_str() else {
        return;
    };
    let height = fixture["log"]["blockNumber"].as_u64().unwrap();
    let release = resolve_release(height, network_of(fixture)).unwrap();
    assert_eq!(release.name, name);
}

// ─── Bridge (Solidity-format events) ─────────────────────────────────────────

#[test]
fn bridge_update_collections_golden() {
    let fixture = load_fixture("bridge-update-collections.json");
    assert_release(&fixture);
    assert_matches_fixture(&fixture);
}

#[test]
fn bridge_pegout_transaction_created_golden() {
    let fixture = load_fixture("bridge-pegout-transaction-created.json");
    assert_release(&fixture);
    assert_matches_fixture(&fixture);
}

#[test]
fn bridge_pegout_before_lovell_stays_raw() {
    let fixture = load_fixture("bridge-pegout-transaction-created.json");
    let mut early = fixture.clone();
    early["log"]["blockNumber"] = serde_json::json!(5_650_461);
    let decoded = decode_fixture(&early);
    assert!(decoded.get("event").is_none(), "decoded as {:?}", decoded["event"]);
    assert!(decoded.get("_addresses").is_none());
    assert_eq!(decoded["topics"], fixture["log"]["topics"]);
}

// ─── Bridge (legacy ASCII topic / RLP data) ──────────────────────────────────

#[test]
fn bridge_legacy_update_collections_golden() {
    let fixture = load_fixture("bridge-legacy-update-collections.json");
    assert_release(&fixture);
    assert_matches_fixture(&fixture);
}

// ─── Standard contracts ──────────────────────────────────────────────────────

#[test]
fn usdrif_upgraded_golden() {
    let fixture = load_fixture("usdrif-upgraded.json");
    assert_matches_fixture(&fixture);
}

#[test]
fn batch_keeps_fixture_order() {
    let names = [
        "usdrif-upgraded.json",
        "bridge-update-collections.json",
        "bridge-pegout-transaction-created.json",
    ];
    let parser = ContractParser::new(
        ParserConfig::for_network(Network::Testnet),
        Arc::new(OfflineNode),
    )
    .unwrap();
    let logs: Vec<RawLog> = names
        .iter()
        .map(|n| serde_json::from_value(load_fixture(n)["log"].clone()).unwrap())
        .collect();

    let decoded = parser.parse_tx_logs(&logs).unwrap();
    let events: Vec<_> = decoded.iter().map(|d| d.event.as_deref()).collect();
    assert_eq!(
        events,
        vec![
            Some("Upgraded"),
            Some("update_collections"),
            Some("pegout_transaction_created")
        ]
    );
    for (log, out) in logs.iter().zip(&decoded) {
        assert_eq!(&out.log, log);
    }
}
