//! blockfeed-evm — EVM JSON-RPC implementation of the feed's `BlockSource`.

pub mod client;

pub use client::{parse_hex_u64, EvmBlockSource, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
