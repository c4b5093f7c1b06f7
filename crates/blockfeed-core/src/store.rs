//! In-memory block store — the append-only working set of ingested blocks.
//!
//! The store backs the synchronous "current block" query path; the fan-out
//! path never reads from it. Retention is explicit: `None` keeps every block
//! for the process lifetime, `Some(k)` keeps a ring of the last `k`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::FeedError;
use crate::types::{Block, Height};

/// Append-only buffer of ingested blocks.
///
/// Blocks are shared as `Arc<Block>`; appending never copies transaction data.
pub struct BlockStore {
    blocks: Mutex<VecDeque<Arc<Block>>>,
    /// Maximum number of blocks to retain (`None` = unbounded).
    retention: Option<usize>,
}

impl BlockStore {
    /// Create a store that retains every ingested block.
    pub fn unbounded() -> Self {
        Self {
            blocks: Mutex::new(VecDeque::new()),
            retention: None,
        }
    }

    /// Create a store that retains only the latest `capacity` blocks.
    pub fn with_retention(capacity: usize) -> Self {
        Self {
            blocks: Mutex::new(VecDeque::with_capacity(capacity)),
            retention: Some(capacity),
        }
    }

    /// Append a block, evicting the oldest if the retention limit is reached.
    pub fn append(&self, block: Arc<Block>) {
        let mut blocks = self.blocks.lock().unwrap();
        if let Some(cap) = self.retention {
            while blocks.len() >= cap {
                blocks.pop_front();
            }
        }
        blocks.push_back(block);
    }

    /// Returns the most recently appended block.
    pub fn latest(&self) -> Result<Arc<Block>, FeedError> {
        self.blocks
            .lock()
            .unwrap()
            .back()
            .cloned()
            .ok_or(FeedError::EmptyStore)
    }

    /// Returns a block by height if it is still retained.
    pub fn get(&self, height: Height) -> Option<Arc<Block>> {
        self.blocks
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.number == height)
            .cloned()
    }

    /// Number of blocks currently retained.
    pub fn len(&self) -> usize {
        self.blocks.lock().unwrap().len()
    }

    /// Returns `true` if nothing has been ingested yet.
    pub fn is_empty(&self) -> bool {
        self.blocks.lock().unwrap().is_empty()
    }
}
