//! The ingestion loop — polls the block source on a fixed period and
//! publishes every unseen block, in height order, exactly once.
//!
//! On each tick the loop reads the chain head, then walks the contiguous
//! range of unseen heights: fetch, append to the store, publish to the
//! broker, advance the cursor. Failures never escape the loop:
//!
//! - `current_height` failing skips the tick; the cursor is untouched.
//! - `block_at` failing mid-range ends the tick at the last published
//!   height, so no gap is silently skipped; the rest is retried next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::broker::Broker;
use crate::config::FeedConfig;
use crate::cursor::Cursor;
use crate::error::FeedError;
use crate::source::BlockSource;
use crate::store::BlockStore;

/// Single producer of the feed: owns the cursor, drives the source.
pub struct IngestLoop<S> {
    source: S,
    store: Arc<BlockStore>,
    broker: Arc<Broker>,
    config: FeedConfig,
    cursor: Cursor,
}

impl<S: BlockSource> IngestLoop<S> {
    /// Read the chain head once and position the cursor so the first tick
    /// publishes from that height onward.
    ///
    /// This is the only source failure that surfaces to the caller; once the
    /// loop is running, failures are contained and retried.
    pub async fn init(
        source: S,
        store: Arc<BlockStore>,
        broker: Arc<Broker>,
        config: FeedConfig,
    ) -> Result<Self, FeedError> {
        let head = source.current_height().await?;
        tracing::info!(head, "ingestion initialized");
        Ok(Self {
            source,
            store,
            broker,
            config,
            cursor: Cursor::starting_at(head),
        })
    }

    /// The loop's current position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Fetch and publish every unseen height up to the current head, in
    /// ascending order. Returns the number of blocks published this tick.
    pub async fn tick(&mut self) -> Result<usize, FeedError> {
        let target = self.source.current_height().await?;
        let delay = Duration::from_millis(self.config.block_delay_ms);
        let mut published = 0;

        while self.cursor.next() <= target {
            let height = self.cursor.next();
            // On failure the cursor stays at the last published height.
            let block = Arc::new(self.source.block_at(height).await?);

            self.store.append(block.clone());
            let delivered = self.broker.publish(&block);
            self.cursor.advance_past(height);
            published += 1;

            tracing::info!(
                height,
                txs = block.transactions.len(),
                delivered,
                "block published"
            );

            if !delay.is_zero() && self.cursor.next() <= target {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(published)
    }

    /// Run ticks on the configured period until `shutdown` is cancelled.
    ///
    /// Cancellation stops scheduling further ticks; a tick already in
    /// progress always runs to completion first. Tick failures are logged
    /// and retried on the next period.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let period = Duration::from_millis(self.config.poll_interval_ms);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!(next = self.cursor.next(), "ingestion stopped");
                    return;
                }
                _ = tokio::time::sleep(period) => {
                    match self.tick().await {
                        Ok(_) => {}
                        Err(e) if e.is_retryable() => tracing::warn!(
                            error = %e,
                            next = self.cursor.next(),
                            "tick failed, retrying next period"
                        ),
                        Err(e) => tracing::error!(
                            error = %e,
                            next = self.cursor.next(),
                            "tick failed with a non-transient error"
                        ),
                    }
                }
            }
        }
    }
}
