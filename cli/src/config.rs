//! TOML configuration file for the `blockfeed` binary.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use blockfeed_core::FeedConfig;

/// Top-level config file shape.
///
/// ```toml
/// [ethereum]
/// url = "https://ethereum-rpc.publicnode.com"
///
/// [feed]
/// poll_interval_ms = 5000
/// block_delay_ms = 1000
/// inbox_capacity = 1024
/// retention = 1024
///
/// [watch]
/// addresses = ["0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"]
/// ```
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub ethereum: EthereumConfig,
    #[serde(default)]
    pub feed: FeedConfigFile,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Deserialize)]
pub struct EthereumConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,
}

/// `[feed]` section; every field falls back to the core default.
#[derive(Debug, Default, Deserialize)]
pub struct FeedConfigFile {
    pub poll_interval_ms: Option<u64>,
    pub block_delay_ms: Option<u64>,
    pub inbox_capacity: Option<usize>,
    pub retention: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WatchConfig {
    /// Addresses the demo subscriber watches (empty = no subscriber).
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl CliConfig {
    /// Load and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Merge the `[feed]` section over the core defaults.
    pub fn feed_config(&self) -> FeedConfig {
        let defaults = FeedConfig::default();
        FeedConfig {
            poll_interval_ms: self.feed.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
            block_delay_ms: self.feed.block_delay_ms.unwrap_or(defaults.block_delay_ms),
            inbox_capacity: self.feed.inbox_capacity.unwrap_or(defaults.inbox_capacity),
            retention: self.feed.retention.or(defaults.retention),
        }
    }
}
