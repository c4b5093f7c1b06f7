//! Feed configuration and fluent builder.

use serde::Deserialize;

/// Configuration for the ingestion loop and broker.
///
/// Deserializes from a config-file section; omitted fields take the
/// defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Tick period of the ingestion loop (milliseconds).
    pub poll_interval_ms: u64,
    /// Pause between consecutive block fetches within one tick, to respect
    /// source rate limits (milliseconds, 0 = none).
    pub block_delay_ms: u64,
    /// Pending-block capacity of each subscriber inbox.
    pub inbox_capacity: usize,
    /// How many blocks the store retains. `None` = keep everything for the
    /// process lifetime.
    pub retention: Option<usize>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            block_delay_ms: 1000,
            inbox_capacity: 1024,
            retention: None,
        }
    }
}

/// Fluent builder for [`FeedConfig`].
#[derive(Default)]
pub struct FeedBuilder {
    config: FeedConfig,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick period in milliseconds.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the inter-block fetch delay in milliseconds.
    pub fn block_delay_ms(mut self, ms: u64) -> Self {
        self.config.block_delay_ms = ms;
        self
    }

    /// Set the subscriber inbox capacity.
    pub fn inbox_capacity(mut self, capacity: usize) -> Self {
        self.config.inbox_capacity = capacity;
        self
    }

    /// Retain only the latest `blocks` in the store.
    pub fn retention(mut self, blocks: usize) -> Self {
        self.config.retention = Some(blocks);
        self
    }

    pub fn build(self) -> FeedConfig {
        self.config
    }
}
