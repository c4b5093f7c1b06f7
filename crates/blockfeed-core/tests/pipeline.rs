//! End-to-end pipeline tests: scripted source → ingestion → broker →
//! session filtering.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use blockfeed_core::{
    Block, BlockSource, BlockStore, Broker, FeedBuilder, FeedError, Height, IngestLoop, Session,
    Transaction,
};

const ALICE: &str = "0xAABB00112233445566778899aabbccddeeff0011";
const BOB: &str = "0x9999999999999999999999999999999999999999";
const CAROL: &str = "0x5555555555555555555555555555555555555555";

/// A chain whose blocks are scripted up front.
struct ScriptedChain {
    head: AtomicU64,
    blocks: Mutex<HashMap<Height, Block>>,
}

impl ScriptedChain {
    fn new(head: Height) -> Arc<Self> {
        Arc::new(Self {
            head: AtomicU64::new(head),
            blocks: Mutex::new(HashMap::new()),
        })
    }

    fn put(&self, height: Height, transactions: Vec<Transaction>) {
        self.blocks.lock().unwrap().insert(
            height,
            Block {
                number: height,
                hash: format!("0x{height:x}"),
                parent_hash: format!("0x{:x}", height.saturating_sub(1)),
                timestamp: "0x0".into(),
                transactions,
            },
        );
        if height > self.head.load(Ordering::SeqCst) {
            self.head.store(height, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl BlockSource for ScriptedChain {
    async fn current_height(&self) -> Result<Height, FeedError> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn block_at(&self, height: Height) -> Result<Block, FeedError> {
        self.blocks
            .lock()
            .unwrap()
            .get(&height)
            .cloned()
            .ok_or_else(|| FeedError::SourceUnavailable(format!("no block {height}")))
    }
}

fn transfer(from: &str, to: &str) -> Transaction {
    Transaction {
        hash: "0xfeed".into(),
        from: from.into(),
        to: to.into(),
        value: "0xde0b6b3a7640000".into(),
    }
}

fn pipeline() -> (Arc<BlockStore>, Arc<Broker>) {
    let config = FeedBuilder::new().block_delay_ms(0).build();
    let store = Arc::new(BlockStore::unbounded());
    let broker = Arc::new(Broker::new(config.inbox_capacity));
    (store, broker)
}

#[tokio::test]
async fn shared_source_handle_is_a_source() {
    let chain = ScriptedChain::new(3);
    chain.put(3, vec![]);

    // Arc<ScriptedChain> is usable wherever a BlockSource is expected.
    let shared: Arc<ScriptedChain> = chain.clone();
    assert_eq!(shared.current_height().await.unwrap(), 3);
    assert_eq!(shared.block_at(3).await.unwrap().number, 3);
}

#[tokio::test]
async fn catchup_range_arrives_in_order() {
    let chain = ScriptedChain::new(10);
    chain.put(10, vec![]);
    let (store, broker) = pipeline();

    let mut ingest = IngestLoop::init(
        chain.clone(),
        store.clone(),
        broker.clone(),
        FeedBuilder::new().block_delay_ms(0).build(),
    )
    .await
    .unwrap();

    let mut sub = broker.subscribe();
    chain.put(11, vec![]);
    chain.put(12, vec![]);

    assert_eq!(ingest.tick().await.unwrap(), 3);

    let heights: Vec<Height> = sub.drain().map(|b| b.number).collect();
    assert_eq!(heights, vec![10, 11, 12]);
    assert_eq!(store.latest().unwrap().number, 12);
}

#[tokio::test]
async fn session_filters_case_insensitively() {
    let chain = ScriptedChain::new(100);
    // One matching transaction (different case) among nine unrelated ones.
    let mut txs = vec![transfer(ALICE, BOB)];
    for _ in 0..9 {
        txs.push(transfer(BOB, CAROL));
    }
    chain.put(100, txs);

    let (store, broker) = pipeline();
    let mut ingest = IngestLoop::init(
        chain.clone(),
        store.clone(),
        broker.clone(),
        FeedBuilder::new().block_delay_ms(0).build(),
    )
    .await
    .unwrap();

    let mut session = Session::open(&broker, store);
    session
        .add_interest(&ALICE.to_ascii_uppercase().replace("0X", "0x"))
        .unwrap();

    ingest.tick().await.unwrap();

    let (block, matches) = session.next_matches().await.unwrap();
    assert_eq!(block.number, 100);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].from, ALICE);
}

#[tokio::test]
async fn uninterested_session_sees_no_matches_but_keeps_latest_query() {
    let chain = ScriptedChain::new(5);
    chain.put(5, vec![transfer(ALICE, BOB)]);

    let (store, broker) = pipeline();
    let mut ingest = IngestLoop::init(
        chain.clone(),
        store.clone(),
        broker.clone(),
        FeedBuilder::new().block_delay_ms(0).build(),
    )
    .await
    .unwrap();

    let mut session = Session::open(&broker, store);
    ingest.tick().await.unwrap();

    // Empty interest set: the raw block is queued but nothing matches.
    let raw = session.subscription().drain().count();
    assert_eq!(raw, 1);
    assert_eq!(session.current_block().unwrap().number, 5);
}

#[tokio::test]
async fn late_subscriber_misses_earlier_blocks() {
    let chain = ScriptedChain::new(1);
    chain.put(1, vec![]);
    let (store, broker) = pipeline();
    let mut ingest = IngestLoop::init(
        chain.clone(),
        store.clone(),
        broker.clone(),
        FeedBuilder::new().block_delay_ms(0).build(),
    )
    .await
    .unwrap();

    ingest.tick().await.unwrap();

    let mut late = broker.subscribe();
    chain.put(2, vec![]);
    ingest.tick().await.unwrap();

    let heights: Vec<Height> = late.drain().map(|b| b.number).collect();
    assert_eq!(heights, vec![2]); // block 1 predates the registration
    assert_eq!(store.latest().unwrap().number, 2);
}

#[tokio::test]
async fn interest_removal_applies_to_subsequent_blocks() {
    let chain = ScriptedChain::new(1);
    chain.put(1, vec![transfer(BOB, ALICE)]);
    let (store, broker) = pipeline();
    let mut ingest = IngestLoop::init(
        chain.clone(),
        store.clone(),
        broker.clone(),
        FeedBuilder::new().block_delay_ms(0).build(),
    )
    .await
    .unwrap();

    let mut session = Session::open(&broker, store);
    session.add_interest(ALICE).unwrap();

    ingest.tick().await.unwrap();
    let (_, matches) = session.next_matches().await.unwrap();
    assert_eq!(matches.len(), 1);

    // Deactivate and publish another matching block: nothing comes through.
    session.remove_interest(ALICE).unwrap();
    chain.put(2, vec![transfer(BOB, ALICE)]);
    ingest.tick().await.unwrap();

    assert_eq!(session.subscription().drain().count(), 1); // raw block only
}
