//! `chainparser decode-logs`: offline decoding of logs read from JSON.

use anyhow::{bail, Context, Result};
use chainparser::{ContractParser, RawLog};
use serde_json::Value;
use std::io::Read;

pub fn run(parser: &ContractParser, file: &str, pretty: bool) -> Result<()> {
    let text = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?
    };

    let logs = parse_logs(&text)?;
    let decoded = parser.parse_tx_logs(&logs)?;
    let undecoded = decoded.iter().filter(|l| !l.is_decoded()).count();
    tracing::info!(total = decoded.len(), undecoded, "logs decoded");

    let out = if pretty {
        serde_json::to_string_pretty(&decoded)?
    } else {
        serde_json::to_string(&decoded)?
    };
    println!("{out}");
    Ok(())
}

/// An array of logs, a receipt (`{"logs": [...]}`) or a single log.
fn parse_logs(text: &str) -> Result<Vec<RawLog>> {
    let value: Value = serde_json::from_str(text).context("input is not JSON")?;
    let logs = match value {
        Value::Array(_) => value,
        Value::Object(ref obj) if obj.contains_key("logs") => obj["logs"].clone(),
        Value::Object(ref obj) if obj.contains_key("topics") => Value::Array(vec![value.clone()]),
        _ => bail!("expected an array of logs or a receipt"),
    };
    serde_json::from_value(logs).context("malformed log entry")
}
