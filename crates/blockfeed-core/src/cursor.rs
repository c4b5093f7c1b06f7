//! Ingestion cursor — the loop's position in the chain.

use crate::types::Height;

/// Tracks the next height to fetch and publish.
///
/// The cursor only moves forward: a height is passed exactly once, and only
/// after the block at that height was actually published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    next: Height,
}

impl Cursor {
    /// Start the cursor so that `head` is the first height to publish
    /// (cursor = head − 1 in last-published terms).
    pub fn starting_at(head: Height) -> Self {
        Self { next: head }
    }

    /// The next height to fetch.
    pub fn next(&self) -> Height {
        self.next
    }

    /// Record that `height` was published. Never moves backwards.
    pub fn advance_past(&mut self, height: Height) {
        if height >= self.next {
            self.next = height + 1;
        }
    }
}
