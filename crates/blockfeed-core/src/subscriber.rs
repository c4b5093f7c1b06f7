//! Subscription — one connection's inbox plus its interest set.
//!
//! The inbox carries raw blocks, not pre-filtered results: filtering happens
//! at drain time, so an interest change takes effect immediately for blocks
//! that have not been drained yet.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::broker::{Broker, SubscriberId};
use crate::error::FeedError;
use crate::interest::InterestSet;
use crate::types::{Block, Transaction};

/// A live registration with the broker.
///
/// Created by [`Broker::subscribe`]; dropping it removes the registration
/// before the inbox is discarded, so no further pushes target a freed inbox.
pub struct Subscription {
    id: SubscriberId,
    inbox: mpsc::Receiver<Arc<Block>>,
    interests: InterestSet,
    dropped: Arc<AtomicU64>,
    broker: Arc<Broker>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        inbox: mpsc::Receiver<Arc<Block>>,
        interests: InterestSet,
        dropped: Arc<AtomicU64>,
        broker: Arc<Broker>,
    ) -> Self {
        Self {
            id,
            inbox,
            interests,
            dropped,
            broker,
        }
    }

    /// This registration's handle.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Mark an address as watched. See [`InterestSet::add`].
    pub fn add_interest(&self, address: &str) -> Result<bool, FeedError> {
        self.interests.add(address)
    }

    /// Stop watching an address. See [`InterestSet::remove`].
    pub fn remove_interest(&self, address: &str) -> Result<bool, FeedError> {
        self.interests.remove(address)
    }

    /// A shared handle to this subscription's interest set, for a control
    /// path that lives on another task than the drain loop.
    pub fn interests(&self) -> InterestSet {
        self.interests.clone()
    }

    /// Wait for the next queued block. Returns `None` once the subscription
    /// has been unregistered and the inbox fully drained.
    pub async fn recv(&mut self) -> Option<Arc<Block>> {
        self.inbox.recv().await
    }

    /// Lazily drain the blocks queued so far, oldest first.
    ///
    /// The iterator stops at the first empty poll; call again after more
    /// publishes to pick up where it left off.
    pub fn drain(&mut self) -> impl Iterator<Item = Arc<Block>> + '_ {
        std::iter::from_fn(move || self.inbox.try_recv().ok())
    }

    /// Wait for the next block containing at least one transaction matching
    /// the current interest set, and return the matches in block order.
    pub async fn next_matches(&mut self) -> Option<(Arc<Block>, Vec<Transaction>)> {
        while let Some(block) = self.inbox.recv().await {
            let matches = self.interests.filter(&block);
            if !matches.is_empty() {
                return Some((block, matches));
            }
        }
        None
    }

    /// Blocks dropped for this subscriber because its inbox was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broker.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCHED: &str = "0xAABBccDD00112233445566778899aabbCCDDeeff";

    fn block(number: u64, txs: Vec<Transaction>) -> Arc<Block> {
        Arc::new(Block {
            number,
            hash: format!("0x{number:x}"),
            parent_hash: format!("0x{:x}", number.saturating_sub(1)),
            timestamp: "0x0".into(),
            transactions: txs,
        })
    }

    fn tx_to(to: &str) -> Transaction {
        Transaction {
            hash: "0xdead".into(),
            from: "0x1111111111111111111111111111111111111111".into(),
            to: to.into(),
            value: "0x1".into(),
        }
    }

    #[tokio::test]
    async fn drain_is_restartable() {
        let broker = Arc::new(Broker::new(8));
        let mut sub = broker.subscribe();

        broker.publish(&block(1, vec![]));
        assert_eq!(sub.drain().count(), 1);
        assert_eq!(sub.drain().count(), 0); // empty now

        broker.publish(&block(2, vec![]));
        broker.publish(&block(3, vec![]));
        let heights: Vec<u64> = sub.drain().map(|b| b.number).collect();
        assert_eq!(heights, vec![2, 3]);
    }

    #[tokio::test]
    async fn interest_change_applies_to_undrained_blocks() {
        let broker = Arc::new(Broker::new(8));
        let mut sub = broker.subscribe();

        // Block enqueued before any interest exists.
        broker.publish(&block(1, vec![tx_to(WATCHED)]));
        sub.add_interest(WATCHED).unwrap();

        let (blk, matches) = sub.next_matches().await.unwrap();
        assert_eq!(blk.number, 1);
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn next_matches_skips_irrelevant_blocks() {
        let broker = Arc::new(Broker::new(8));
        let mut sub = broker.subscribe();
        sub.add_interest(WATCHED).unwrap();

        broker.publish(&block(1, vec![])); // nothing to match
        broker.publish(&block(2, vec![tx_to("0x2222222222222222222222222222222222222222")]));
        broker.publish(&block(3, vec![tx_to(&WATCHED.to_ascii_lowercase())]));

        let (blk, matches) = sub.next_matches().await.unwrap();
        assert_eq!(blk.number, 3);
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn recv_returns_none_after_unsubscribe() {
        let broker = Arc::new(Broker::new(8));
        let mut sub = broker.subscribe();
        broker.publish(&block(1, vec![]));
        broker.unsubscribe(sub.id());

        // Queued block is still drained, then the channel reports closed.
        assert_eq!(sub.recv().await.unwrap().number, 1);
        assert!(sub.recv().await.is_none());
    }
}
