//! EVM JSON-RPC block source.
//!
//! Speaks `eth_blockNumber` and `eth_getBlockByNumber` (with full
//! transaction objects) against any EVM JSON-RPC endpoint. Every transport
//! or protocol failure is collapsed into `FeedError::SourceUnavailable` —
//! the feed core does not distinguish causes, it only retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use blockfeed_core::{Block, BlockSource, FeedError, Height, Transaction};

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id: 1,
        }
    }
}

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// Protocol-level error object returned by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

// ─── Raw wire shapes ──────────────────────────────────────────────────────────

/// `eth_getBlockByNumber` block shape (the fields the feed carries).
#[derive(Debug, Deserialize)]
struct RawBlock {
    number: String,
    hash: String,
    #[serde(rename = "parentHash")]
    parent_hash: String,
    timestamp: String,
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    hash: String,
    from: String,
    /// `null` for contract creations.
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    value: String,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Block {
            number: parse_hex_u64(&raw.number),
            hash: raw.hash,
            parent_hash: raw.parent_hash,
            timestamp: raw.timestamp,
            transactions: raw
                .transactions
                .into_iter()
                .map(|tx| Transaction {
                    hash: tx.hash,
                    from: tx.from,
                    to: tx.to.unwrap_or_default(),
                    value: tx.value,
                })
                .collect(),
        }
    }
}

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> u64 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).unwrap_or(0)
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// `BlockSource` backed by an EVM JSON-RPC endpoint over HTTP.
pub struct EvmBlockSource {
    url: String,
    http: reqwest::Client,
}

impl EvmBlockSource {
    /// Create a source for the given endpoint URL with a request timeout.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| FeedError::SourceUnavailable(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    /// Create with a 30 second request timeout.
    pub fn default_for(url: impl Into<String>) -> Result<Self, FeedError> {
        Self::new(url, Duration::from_secs(30))
    }

    /// The endpoint this source talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, FeedError> {
        let req = JsonRpcRequest::new(method, params);
        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| FeedError::SourceUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FeedError::SourceUnavailable(format!(
                "HTTP {} from {}",
                resp.status().as_u16(),
                self.url
            )));
        }

        let rpc: JsonRpcResponse = resp
            .json()
            .await
            .map_err(|e| FeedError::SourceUnavailable(e.to_string()))?;

        if let Some(err) = rpc.error {
            return Err(FeedError::SourceUnavailable(format!(
                "RPC error {}: {}",
                err.code, err.message
            )));
        }
        Ok(rpc.result)
    }
}

#[async_trait]
impl BlockSource for EvmBlockSource {
    async fn current_height(&self) -> Result<Height, FeedError> {
        let result = self.call("eth_blockNumber", vec![]).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| FeedError::SourceUnavailable("non-string block number".into()))?;
        Ok(parse_hex_u64(hex))
    }

    async fn block_at(&self, height: Height) -> Result<Block, FeedError> {
        let result = self
            .call(
                "eth_getBlockByNumber",
                vec![json!(format!("0x{height:x}")), json!(true)],
            )
            .await?;
        if result.is_null() {
            return Err(FeedError::SourceUnavailable(format!(
                "block {height} not yet available"
            )));
        }
        let raw: RawBlock = serde_json::from_value(result)
            .map_err(|e| FeedError::SourceUnavailable(e.to_string()))?;
        tracing::debug!(height, txs = raw.transactions.len(), "block fetched");
        Ok(raw.into())
    }
}
