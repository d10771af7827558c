//! `chainparser release | selector`: offline lookups.

use anyhow::{Context, Result};
use chainparser::{resolve_release, Network, ReleaseHeight};
use chainparser_core::signature::{keccak256_hex, method_selector};

pub fn release(network: Network, height: &str, with_methods: bool) -> Result<()> {
    let height: ReleaseHeight = height.parse()?;
    let release = resolve_release(height, network)
        .with_context(|| format!("no bridge releases for {network}"))?;

    println!("Release:    {}", release.name);
    println!("Activation: {}", release.height);
    println!("Network:    {network} (queried at {height})");

    if with_methods {
        let abi = release.abi()?;
        let mut methods: Vec<String> = abi
            .iter()
            .filter(|f| f.is_function())
            .filter_map(chainparser_core::signature::canonical_signature)
            .collect();
        methods.sort();
        println!("Methods:    {}", methods.len());
        for method in methods {
            println!("  {}  {method}", method_selector(&method));
        }
    }
    Ok(())
}

pub fn selectors(signatures: &[String]) {
    for sig in signatures {
        let sig: String = sig.chars().filter(|c| !c.is_whitespace()).collect();
        println!("{}  {}  {sig}", method_selector(&sig), keccak256_hex(&sig));
    }
}
