//! blockfeed-core — block ingestion, fan-out, and address-filtered delivery.
//!
//! # Architecture
//!
//! ```text
//! IngestLoop ── polls ──> BlockSource (remote chain endpoint)
//!     │
//!     ├── append ──> BlockStore   (in-memory working set, `latest()` queries)
//!     └── publish ─> Broker ── try_send ──> Subscription inbox (bounded, FIFO)
//!                                               │
//!                                    Session / drain task
//!                                    (InterestSet filtering)
//! ```
//!
//! One task runs the [`IngestLoop`]; one task per connection drains its
//! [`Subscription`]. A full inbox drops the incoming block for that
//! subscriber only — publishing never blocks.

pub mod broker;
pub mod config;
pub mod cursor;
pub mod error;
pub mod ingest;
pub mod interest;
pub mod session;
pub mod source;
pub mod store;
pub mod subscriber;
pub mod types;

pub use broker::{Broker, SubscriberId};
pub use config::{FeedBuilder, FeedConfig};
pub use cursor::Cursor;
pub use error::FeedError;
pub use ingest::IngestLoop;
pub use interest::InterestSet;
pub use session::Session;
pub use source::BlockSource;
pub use store::BlockStore;
pub use subscriber::Subscription;
pub use types::{Block, Height, Transaction};
