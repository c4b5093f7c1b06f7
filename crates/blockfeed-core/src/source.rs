//! The capability the ingestion loop consumes: a remote chain endpoint.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FeedError;
use crate::types::{Block, Height};

/// Trait for fetching chain data from a remote endpoint.
///
/// The core only distinguishes success from failure; error causes stay opaque
/// inside [`FeedError::SourceUnavailable`].
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// The height of the chain head right now.
    async fn current_height(&self) -> Result<Height, FeedError>;

    /// The full block at `height`.
    async fn block_at(&self, height: Height) -> Result<Block, FeedError>;
}

/// A shared source is a source: lets callers hand the same endpoint to the
/// ingestion loop and to ad-hoc queries without a wrapper type.
#[async_trait]
impl<T: BlockSource + ?Sized> BlockSource for Arc<T> {
    async fn current_height(&self) -> Result<Height, FeedError> {
        (**self).current_height().await
    }

    async fn block_at(&self, height: Height) -> Result<Block, FeedError> {
        (**self).block_at(height).await
    }
}
