//! Fan-out broker — one producer, N independent subscribers.
//!
//! The broker owns the subscriber registry and pushes every published block
//! into each live subscriber's bounded inbox without blocking. A full inbox
//! drops the incoming block for that subscriber only (drop-newest), so a slow
//! consumer loses blocks but never slows ingestion or its peers. Drops are
//! counted per subscriber and broker-wide.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::interest::InterestSet;
use crate::subscriber::Subscription;
use crate::types::Block;

/// Handle identifying one registration, unique for the broker's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct Entry {
    tx: mpsc::Sender<Arc<Block>>,
    dropped: Arc<AtomicU64>,
}

/// Registry of live subscribers plus the publish fan-out path.
pub struct Broker {
    registry: Mutex<HashMap<SubscriberId, Entry>>,
    next_id: AtomicU64,
    inbox_capacity: usize,
    dropped_total: AtomicU64,
}

impl Broker {
    /// Create a broker whose subscriber inboxes hold `inbox_capacity` pending
    /// blocks each. A capacity of 0 is treated as 1: an inbox must be able to
    /// hold at least one block, and tokio's bounded channel rejects 0.
    pub fn new(inbox_capacity: usize) -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            inbox_capacity: inbox_capacity.max(1),
            dropped_total: AtomicU64::new(0),
        }
    }

    /// Register a new subscriber with an empty interest set and inbox.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.inbox_capacity);
        let dropped = Arc::new(AtomicU64::new(0));

        self.registry.lock().unwrap().insert(
            id,
            Entry {
                tx,
                dropped: dropped.clone(),
            },
        );
        tracing::debug!(subscriber = id.0, "subscriber registered");

        Subscription::new(id, rx, InterestSet::new(), dropped, self.clone())
    }

    /// Remove a subscriber from the registry. Idempotent: removing an
    /// already-removed handle is a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) {
        if self.registry.lock().unwrap().remove(&id).is_some() {
            tracing::debug!(subscriber = id.0, "subscriber unregistered");
        }
    }

    /// Push `block` into every live subscriber's inbox.
    ///
    /// Never blocks and never errors. Returns the number of subscribers the
    /// block was actually enqueued for. Entries whose receiver is gone are
    /// pruned here.
    pub fn publish(&self, block: &Arc<Block>) -> usize {
        let mut registry = self.registry.lock().unwrap();
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, entry) in registry.iter() {
            match entry.tx.try_send(block.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    entry.dropped.fetch_add(1, Ordering::Relaxed);
                    self.dropped_total.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        subscriber = id.0,
                        height = block.number,
                        "inbox full, block dropped for subscriber"
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }
        for id in closed {
            registry.remove(&id);
        }
        delivered
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().unwrap().len()
    }

    /// Total blocks dropped across all subscribers since startup.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total.load(Ordering::Relaxed)
    }
}
