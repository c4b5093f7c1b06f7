//! blockfeed CLI — run the block feed against an EVM endpoint.
//!
//! Usage:
//! ```bash
//! blockfeed run --config blockfeed.toml
//! blockfeed info
//! ```

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use blockfeed_core::{BlockStore, Broker, IngestLoop, Session};
use blockfeed_evm::EvmBlockSource;

mod config;

use config::CliConfig;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => {
            let config_path = match args.iter().position(|a| a == "--config") {
                Some(i) => args.get(i + 1).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    process::exit(1);
                }),
                None => "blockfeed.toml".to_string(),
            };
            cmd_run(&config_path)
        }
        "info" => {
            cmd_info();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("blockfeed {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("blockfeed {}", env!("CARGO_PKG_VERSION"));
    println!("Block ingestion and address-filtered fan-out for EVM chains\n");
    println!("USAGE:");
    println!("    blockfeed <COMMAND>\n");
    println!("COMMANDS:");
    println!("    run      Run the feed (--config <path>, default blockfeed.toml)");
    println!("    info     Show default configuration");
    println!("    version  Print version");
    println!("    help     Print this help");
}

fn cmd_info() {
    println!("BlockFeed v{}", env!("CARGO_PKG_VERSION"));
    println!("  Default poll interval: 5000 ms");
    println!("  Default inter-block delay: 1000 ms");
    println!("  Default inbox capacity: 1024 blocks/subscriber");
    println!("  Default retention: unbounded");
}

fn cmd_run(config_path: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CliConfig::load(config_path)?;

    tokio::runtime::Runtime::new()
        .context("building tokio runtime")?
        .block_on(run_feed(config))
}

async fn run_feed(config: CliConfig) -> anyhow::Result<()> {
    let feed = config.feed_config();

    let store = Arc::new(match feed.retention {
        Some(k) => BlockStore::with_retention(k),
        None => BlockStore::unbounded(),
    });
    let broker = Arc::new(Broker::new(feed.inbox_capacity));
    let source = EvmBlockSource::default_for(&config.ethereum.url)
        .context("building JSON-RPC client")?;

    tracing::info!(url = %config.ethereum.url, "connecting to endpoint");
    let ingest = IngestLoop::init(source, store.clone(), broker.clone(), feed)
        .await
        .context("reading initial chain height")?;

    let shutdown = CancellationToken::new();

    let watcher = if config.watch.addresses.is_empty() {
        None
    } else {
        let mut session = Session::open(&broker, store.clone());
        for address in &config.watch.addresses {
            let fresh = session
                .add_interest(address)
                .with_context(|| format!("watching address {address}"))?;
            tracing::info!(address = %address, fresh, "watching address");
        }
        let token = shutdown.clone();
        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    matched = session.next_matches() => {
                        let Some((block, txs)) = matched else { return };
                        for tx in txs {
                            tracing::info!(
                                height = block.number,
                                hash = %tx.hash,
                                from = %tx.from,
                                to = %tx.to,
                                value = %tx.value,
                                "matched transaction"
                            );
                        }
                    }
                }
            }
        }))
    };

    let ingest_handle = tokio::spawn(ingest.run(shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("shutdown requested");
    shutdown.cancel();

    ingest_handle.await.context("joining ingestion task")?;
    if let Some(watcher) = watcher {
        watcher.await.context("joining watcher task")?;
    }
    Ok(())
}
