//! # RPC Handler
//!
//! JSON request handlers over the shared chain. Transport is left to the
//! caller: every handler takes and returns `serde_json::Value`.
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `get_latest_block` | none | `{block, transactions}` or `"None"` |
//! | `get_block_by_hash` | `{hash}` | `{block, transactions}` or `"None"` |
//! | `add_block` | `{block, transactions}` | `{hash, height, is_head}` |
//!
//! `block` is a [`BlockHeader`] object and `transactions` a list of
//! [`Transaction`] objects, both in their record JSON shape.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use mc_03_block_production::{Block, BlockError, BlockHeader, Blockchain};
use shared_crypto::{CryptoError, Hash};
use shared_types::{Record, Transaction, ValidationError};

/// Errors surfaced to RPC callers.
#[derive(Debug, Error)]
pub enum RpcError {
    /// A required request field is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// `hash` is not 64 hex characters.
    #[error("invalid hash: {0}")]
    InvalidHash(#[source] CryptoError),

    /// Request body does not decode.
    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),

    /// Decoded record violates a construction invariant.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The block failed validation.
    #[error(transparent)]
    Rejected(#[from] BlockError),

    /// No handler for the method.
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

/// Handlers sharing one chain.
#[derive(Clone)]
pub struct RpcHandler {
    chain: Arc<RwLock<Blockchain>>,
}

impl RpcHandler {
    pub fn new(chain: Arc<RwLock<Blockchain>>) -> Self {
        Self { chain }
    }

    /// Route `method` to its handler.
    pub fn dispatch(&self, method: &str, params: &Value) -> Result<Value, RpcError> {
        debug!(method, "rpc request");
        match method {
            "get_latest_block" => Ok(self.get_latest_block()),
            "get_block_by_hash" => self.get_block_by_hash(params),
            "add_block" => self.add_block(params),
            other => Err(RpcError::UnknownMethod(other.to_string())),
        }
    }

    /// Canonical head with its transactions.
    pub fn get_latest_block(&self) -> Value {
        let chain = self.chain.read();
        chain.canonical_head().map_or_else(none, block_body)
    }

    /// Block named by `params.hash`.
    pub fn get_block_by_hash(&self, params: &Value) -> Result<Value, RpcError> {
        let hash = params
            .get("hash")
            .and_then(Value::as_str)
            .ok_or(RpcError::MissingField("hash"))?;
        let hash = Hash::from_hex(hash).map_err(RpcError::InvalidHash)?;
        let chain = self.chain.read();
        Ok(chain.get(&hash).map_or_else(none, block_body))
    }

    /// Validate `params.block` against its parent and add it.
    pub fn add_block(&self, params: &Value) -> Result<Value, RpcError> {
        let header: BlockHeader = serde_json::from_value(
            params.get("block").cloned().ok_or(RpcError::MissingField("block"))?,
        )?;
        header.validate()?;
        let transactions: Vec<Transaction> = serde_json::from_value(
            params
                .get("transactions")
                .cloned()
                .ok_or(RpcError::MissingField("transactions"))?,
        )?;
        for tx in &transactions {
            tx.validate()?;
        }

        let mut chain = self.chain.write();
        let hash = chain.import(header, transactions).inspect_err(|err| {
            warn!(error = %err, "add_block rejected");
        })?;
        let height = chain.get(&hash).map(Block::height).unwrap_or_default();
        let is_head = chain.canonical_head().map(Block::hash) == Some(hash);
        Ok(json!({
            "hash": hash,
            "height": height,
            "is_head": is_head,
        }))
    }
}

fn none() -> Value {
    Value::String("None".into())
}

fn block_body(block: &Block) -> Value {
    json!({
        "block": block.header(),
        "transactions": block.skeleton().transactions(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_03_block_production::{BlockProductionConfig, BlockSkeleton, PoWMiner};

    fn config() -> BlockProductionConfig {
        BlockProductionConfig {
            difficulty: 4,
            ..BlockProductionConfig::default()
        }
    }

    fn mine(parent: Option<&Block>, timestamp: u64) -> Block {
        let skeleton = BlockSkeleton::build(parent, vec![], Hash::ZERO, timestamp, &config()).unwrap();
        PoWMiner::new(2, 1_000_000).seal(skeleton).unwrap()
    }

    fn handler() -> RpcHandler {
        RpcHandler::new(Arc::new(RwLock::new(Blockchain::new(config()))))
    }

    #[test]
    fn test_empty_chain_returns_none() {
        let rpc = handler();
        assert_eq!(rpc.get_latest_block(), json!("None"));
        let hash = shared_crypto::sha256(b"x").to_hex();
        assert_eq!(rpc.get_block_by_hash(&json!({ "hash": hash })).unwrap(), json!("None"));
    }

    #[test]
    fn test_add_then_query() {
        let rpc = handler();
        let genesis = mine(None, 0);
        let body = block_body(&genesis);

        let added = rpc.dispatch("add_block", &body).unwrap();
        assert_eq!(added["hash"], json!(genesis.hash().to_hex()));
        assert_eq!(added["height"], json!(1));
        assert_eq!(added["is_head"], json!(true));

        assert_eq!(rpc.get_latest_block(), body);
        let by_hash = rpc
            .dispatch("get_block_by_hash", &json!({ "hash": genesis.hash().to_hex() }))
            .unwrap();
        assert_eq!(by_hash, body);

        let child = mine(Some(&genesis), 1);
        rpc.add_block(&block_body(&child)).unwrap();
        assert_eq!(rpc.get_latest_block()["block"], json!(child.header()));
    }

    #[test]
    fn test_add_block_rejects_orphan() {
        let rpc = handler();
        let genesis = mine(None, 0);
        let child = mine(Some(&genesis), 1);
        assert!(matches!(
            rpc.add_block(&block_body(&child)),
            Err(RpcError::Rejected(BlockError::UnknownParent(_)))
        ));
        assert_eq!(rpc.get_latest_block(), json!("None"));
    }

    #[test]
    fn test_malformed_requests() {
        let rpc = handler();
        assert!(matches!(
            rpc.get_block_by_hash(&json!({})),
            Err(RpcError::MissingField("hash"))
        ));
        assert!(matches!(
            rpc.get_block_by_hash(&json!({ "hash": "zz" })),
            Err(RpcError::InvalidHash(_))
        ));
        assert!(matches!(
            rpc.add_block(&json!({ "block": 1, "transactions": [] })),
            Err(RpcError::Decode(_))
        ));
        assert!(matches!(
            rpc.add_block(&json!({ "transactions": [] })),
            Err(RpcError::MissingField("block"))
        ));
        assert!(matches!(
            rpc.dispatch("mine", &Value::Null),
            Err(RpcError::UnknownMethod(_))
        ));
    }
}
