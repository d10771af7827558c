//! ChainParser CLI: inspect RSK contracts and decode their logs.
//!
//! # Commands
//! ```text
//! chainparser details     --address <addr> [--block <n|latest>]
//! chainparser token-data  --address <addr> [--block <n|latest>]
//! chainparser deployment  --address <addr> [--high <n>]
//! chainparser decode-logs --file <logs.json|->
//! chainparser release     [--height <n|latest>]
//! chainparser selector    <signature>...
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use chainparser::{ContractParser, Network, ParserConfig};
use chainparser_observability::{init_tracing, LogConfig};
use chainparser_rpc::{NodeConfig, RpcNodeClient};

mod cmd_decode;
mod cmd_inspect;
mod cmd_release;

#[derive(Parser)]
#[command(
    name = "chainparser",
    about = "Inspect RSK contracts and decode their logs",
    long_about = "
ChainParser CLI: detect ERC interfaces and proxies, decode bridge and token
logs, and locate contract deployments on RSK.

ENVIRONMENT VARIABLES:
  RSK_NODE_URL    JSON-RPC endpoint used when --rpc is not given
  RSK_NETWORK     mainnet | testnet (same as --network)
  RUST_LOG        log filter, overrides --verbose
",
    version
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Network whose bridge releases and native addresses apply
    #[arg(long, global = true, env = "RSK_NETWORK", default_value = "mainnet")]
    network: Network,

    /// Parser config file (.yaml or .json); --network overrides its net id
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint; defaults to RSK_NODE_URL, then localhost:4444
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Use the public RSK node of the selected network
    #[arg(long, global = true, conflicts_with = "rpc")]
    public: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Methods, ERC interfaces and proxy information of a contract
    Details {
        #[arg(long)]
        address: String,
        /// Block number or tag
        #[arg(long, default_value = "latest")]
        block: String,
    },

    /// name, symbol, decimals and totalSupply of a token
    #[command(name = "token-data")]
    TokenData {
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "latest")]
        block: String,
    },

    /// Block and transaction that deployed a contract
    Deployment {
        #[arg(long)]
        address: String,
        /// Upper bound of the search (default: latest block)
        #[arg(long)]
        high: Option<u64>,
    },

    /// Decode logs from a JSON file: an array of logs or a receipt
    #[command(name = "decode-logs")]
    DecodeLogs {
        /// Path to the JSON file, or `-` for stdin
        #[arg(long)]
        file: String,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Bridge release active at a height
    Release {
        /// Block number or `latest`
        #[arg(long, default_value = "latest")]
        height: String,
        /// Also list the release's bridge methods
        #[arg(long)]
        methods: bool,
    },

    /// Selector and topic hash of canonical signatures
    Selector {
        /// e.g. `transfer(address,uint256)`
        #[arg(required = true)]
        signatures: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    init_tracing(&LogConfig {
        json: cli.json_logs,
        ..LogConfig::with_level(level)
    });

    match &cli.command {
        Commands::Details { address, block } => {
            let parser = build_parser(&cli)?;
            cmd_inspect::details(&parser, address, block).await
        }

        Commands::TokenData { address, block } => {
            let parser = build_parser(&cli)?;
            cmd_inspect::token_data(&parser, address, block).await
        }

        Commands::Deployment { address, high } => {
            let parser = build_parser(&cli)?;
            cmd_inspect::deployment(&parser, address, *high).await
        }

        Commands::DecodeLogs { file, pretty } => {
            let parser = build_parser(&cli)?;
            cmd_decode::run(&parser, file, *pretty)
        }

        Commands::Release { height, methods } => cmd_release::release(cli.network, height, *methods),

        Commands::Selector { signatures } => {
            cmd_release::selectors(signatures);
            Ok(())
        }
    }
}

fn build_parser(cli: &Cli) -> Result<ContractParser> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ParserConfig::default(),
    };
    config.net = ParserConfig::for_network(cli.network).net;

    let node_config = if cli.public {
        NodeConfig::public(cli.network)
            .with_context(|| format!("no public node for {}", cli.network))?
    } else {
        match &cli.rpc {
            Some(url) => NodeConfig::with_url(url.clone()),
            None => NodeConfig::default(),
        }
    };
    tracing::debug!(url = %node_config.url(), network = %cli.network, "connecting");
    let node = RpcNodeClient::from_config(&node_config).context("failed to build node client")?;

    ContractParser::new(config, Arc::new(node)).context("invalid parser configuration")
}
