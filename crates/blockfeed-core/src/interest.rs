//! Per-connection interest set and transaction filtering.
//!
//! An interest set maps normalized addresses to an active flag. Removal marks
//! the address inactive instead of deleting the key, so the map never shrinks;
//! with a bounded address universe per connection this keeps the bookkeeping
//! trivial and makes re-adds cheap.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::FeedError;
use crate::types::{is_valid_address, normalize_address, Block, Transaction};

/// The set of addresses one subscriber wants transactions for.
///
/// Cloning is cheap and shares state: the connection's control path (add /
/// remove) and its drain task hold clones of the same set, guarded by a mutex
/// that is independent of the broker's registry lock.
#[derive(Clone, Default)]
pub struct InterestSet {
    inner: Arc<Mutex<HashMap<String, bool>>>,
}

impl InterestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an address as active.
    ///
    /// Returns `Ok(true)` for a fresh addition and `Ok(false)` if the address
    /// was already active, so callers can detect duplicate subscription
    /// requests. Fails with [`FeedError::InvalidAddress`] on bad syntax
    /// without touching the set.
    pub fn add(&self, address: &str) -> Result<bool, FeedError> {
        if !is_valid_address(address) {
            return Err(FeedError::InvalidAddress(address.to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let was_active = inner.insert(normalize_address(address), true);
        Ok(was_active != Some(true))
    }

    /// Mark an address as inactive.
    ///
    /// Returns `Ok(true)` if the address was active before the call. The key
    /// is retained with an inactive flag rather than removed.
    pub fn remove(&self, address: &str) -> Result<bool, FeedError> {
        if !is_valid_address(address) {
            return Err(FeedError::InvalidAddress(address.to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let was_active = inner.insert(normalize_address(address), false);
        Ok(was_active == Some(true))
    }

    /// Returns `true` if `address` (any case) is an active interest.
    pub fn contains(&self, address: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .get(&normalize_address(address))
            .copied()
            .unwrap_or(false)
    }

    /// Number of active interests.
    pub fn active_count(&self) -> usize {
        self.inner.lock().unwrap().values().filter(|v| **v).count()
    }

    /// Total number of keys, active or not. Exposed because removal is a
    /// soft delete and the map only grows.
    pub fn key_count(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Produce the ordered sub-sequence of `block`'s transactions whose
    /// `from` or `to` is an active interest.
    ///
    /// Short-circuits to an empty result when no interest is active, skipping
    /// the per-transaction comparisons entirely.
    pub fn filter(&self, block: &Block) -> Vec<Transaction> {
        let inner = self.inner.lock().unwrap();
        if !inner.values().any(|v| *v) {
            return vec![];
        }
        let active = |addr: &str| {
            inner
                .get(&normalize_address(addr))
                .copied()
                .unwrap_or(false)
        };
        block
            .transactions
            .iter()
            .filter(|tx| active(&tx.from) || active(&tx.to))
            .cloned()
            .collect()
    }
}
