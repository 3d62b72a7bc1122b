use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    BatchResult, ClientConfigBuilder, EnvFileCredentials, QueryOptions, TokenFilter, Web3Client,
};

/// Command line for the `web3q` binary.
#[derive(Debug, Parser)]
#[command(name = "web3q", version, about = "Query the Moralis Web3 data APIs")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Directory to start the upward search for `.env` (default: current directory)
    #[arg(long, global = true, env = "WEB3Q_KEY_DIR")]
    pub key_dir: Option<PathBuf>,

    /// Per-attempt request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Client-side throttle in requests per second
    #[arg(long, global = true)]
    pub rate_limit: Option<u32>,
}

/// Query options shared by `query`, `paginate` and `batch`.
#[derive(Debug, Args)]
pub struct OptionArgs {
    /// Chain name or hex id (eth, polygon, 0x89, solana, ...)
    #[arg(long)]
    pub chain: Option<String>,

    /// Solana network (mainnet, devnet)
    #[arg(long)]
    pub network: Option<String>,

    /// Extra query parameter as key=value; repeatable
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Start date, e.g. 2024-01-01 or "2 days ago"
    #[arg(long)]
    pub from_date: Option<String>,

    /// End date
    #[arg(long)]
    pub to_date: Option<String>,

    #[arg(long)]
    pub from_block: Option<u64>,

    #[arg(long)]
    pub to_block: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single query
    Query {
        /// Endpoint path, e.g. /:address/balance
        endpoint: String,
        #[arg(long)]
        address: Option<String>,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Follow cursors and print every item
    Paginate {
        endpoint: String,
        #[arg(long)]
        address: Option<String>,
        /// Stop after this many items
        #[arg(long)]
        max_results: Option<usize>,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Run one query per address
    Batch {
        endpoint: String,
        #[arg(required = true)]
        addresses: Vec<String>,
        /// Addresses in flight per window
        #[arg(long)]
        concurrency: Option<usize>,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Search tokens by name, symbol or address
    Search {
        query: String,
        /// Comma-separated chain names or ids
        #[arg(long, value_delimiter = ',')]
        chains: Vec<String>,
        /// Drop tokens flagged as possible spam
        #[arg(long)]
        no_spam: bool,
    },
}

impl OptionArgs {
    fn into_query_options(self, address: Option<String>) -> QueryOptions {
        let mut options = QueryOptions {
            address,
            chain: self.chain,
            network: self.network,
            from_date: self.from_date,
            to_date: self.to_date,
            from_block: self.from_block,
            to_block: self.to_block,
            ..QueryOptions::default()
        };
        for (key, value) in self.params {
            options = options.param(key, value);
        }
        options
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    run_with(Cli::parse()).await
}

/// Run an already parsed command line.
pub async fn run_with(cli: Cli) -> anyhow::Result<()> {
    let client = build_client(&cli.global)?;

    let output = match cli.command {
        Command::Query {
            endpoint,
            address,
            options,
        } => client
            .query(endpoint, options.into_query_options(address))
            .await?
            .into_value(),
        Command::Paginate {
            endpoint,
            address,
            max_results,
            options,
        } => Value::Array(
            client
                .paginate(endpoint, options.into_query_options(address), max_results)
                .await?,
        ),
        Command::Batch {
            endpoint,
            addresses,
            concurrency,
            options,
        } => {
            let batch = client
                .batch_query(
                    endpoint,
                    &addresses,
                    options.into_query_options(None),
                    concurrency,
                )
                .await;
            batch_to_json(&addresses, batch)
        }
        Command::Search {
            query,
            chains,
            no_spam,
        } => {
            let chains: Vec<&str> = chains.iter().map(String::as_str).collect();
            let response = client.search_token(&query, &chains).await?.into_value();
            match response {
                Value::Array(tokens) if no_spam => Value::Array(TokenFilter::spam().apply(tokens)),
                other => other,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    info!(metrics = ?client.metrics(), "Request metrics");
    Ok(())
}

fn build_client(global: &GlobalArgs) -> anyhow::Result<Web3Client> {
    let key_dir = match &global.key_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let mut builder = ClientConfigBuilder::new();
    if let Some(secs) = global.timeout_secs {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    if let Some(requests) = global.rate_limit {
        builder = builder.rate_limit(requests, Duration::from_secs(1));
    }

    let client = Web3Client::new(builder.build(), EnvFileCredentials::new(key_dir))
        .context("Failed to create client")?;
    Ok(client)
}

fn batch_to_json(addresses: &[String], batch: BatchResult) -> Value {
    let items: Vec<Value> = addresses
        .iter()
        .zip(batch.results.into_iter().zip(batch.errors))
        .map(|(address, (result, error))| {
            json!({
                "address": address,
                "result": result.map(|r| r.into_value()),
                "error": error.map(|e| e.to_string()),
            })
        })
        .collect();
    json!({ "items": items, "failed": batch.failed })
}
