//! Connection-scoped session — the surface a transport layer drives.
//!
//! One session per client connection: it owns a [`Subscription`] obtained
//! from the broker and a handle to the block store for synchronous point
//! queries. Teardown is the session's `Drop`, which unregisters from the
//! broker exactly once.

use std::sync::Arc;

use crate::broker::Broker;
use crate::error::FeedError;
use crate::store::BlockStore;
use crate::subscriber::Subscription;
use crate::types::{Block, Transaction};

/// A client connection's view of the feed.
pub struct Session {
    subscription: Subscription,
    store: Arc<BlockStore>,
}

impl Session {
    /// Open a session: registers a fresh subscriber with the broker.
    pub fn open(broker: &Arc<Broker>, store: Arc<BlockStore>) -> Self {
        Self {
            subscription: broker.subscribe(),
            store,
        }
    }

    /// The most recently ingested block, independent of the subscription.
    pub fn current_block(&self) -> Result<Arc<Block>, FeedError> {
        self.store.latest()
    }

    /// Watch an address. `Ok(false)` means it was already watched.
    pub fn add_interest(&self, address: &str) -> Result<bool, FeedError> {
        self.subscription.add_interest(address)
    }

    /// Stop watching an address. `Ok(false)` means it was not active.
    pub fn remove_interest(&self, address: &str) -> Result<bool, FeedError> {
        self.subscription.remove_interest(address)
    }

    /// Wait for the next block with transactions matching this session's
    /// interests. This is the loop a connection's reader task drives.
    pub async fn next_matches(&mut self) -> Option<(Arc<Block>, Vec<Transaction>)> {
        self.subscription.next_matches().await
    }

    /// Direct access to the underlying subscription, for callers that want
    /// raw blocks or drop statistics.
    pub fn subscription(&mut self) -> &mut Subscription {
        &mut self.subscription
    }
}
