//! `chainparser details | token-data | deployment`: reads against a node.

use anyhow::{Context, Result};
use chainparser::{BlockTag, ContractParser, DeploymentQuery};

fn block_tag(block: &str) -> Result<BlockTag> {
    block
        .parse()
        .with_context(|| format!("invalid --block '{block}'"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn details(parser: &ContractParser, address: &str, block: &str) -> Result<()> {
    let details = parser
        .get_contract_details(address, block_tag(block)?)
        .await
        .with_context(|| format!("failed to inspect {address}"))?;
    print_json(&details)
}

pub async fn token_data(parser: &ContractParser, address: &str, block: &str) -> Result<()> {
    let contract = parser.make_contract(address);
    let data = parser
        .get_default_token_data(&contract, block_tag(block)?)
        .await;
    print_json(&data)
}

pub async fn deployment(parser: &ContractParser, address: &str, high: Option<u64>) -> Result<()> {
    let query = DeploymentQuery {
        high_block: high,
        ..DeploymentQuery::default()
    };
    let found = parser
        .bc_search()
        .deployment_tx(address, query)
        .await
        .with_context(|| format!("deployment search for {address} failed"))?;
    match found {
        Some(deployment) => print_json(&deployment),
        None => {
            eprintln!("✗ no code found at {address}");
            std::process::exit(1);
        }
    }
}
