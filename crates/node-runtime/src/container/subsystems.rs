//! # Node Container
//!
//! Holds the blockchain and the miner that extends it.
//!
//! ## Thread Safety
//!
//! - The blockchain is wrapped in `Arc<RwLock<_>>` and shared with the RPC
//!   handler
//! - Sealing runs outside the lock: the parent is cloned under a read lock,
//!   the nonce search runs unlocked, and only the insert takes the write lock

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, instrument};

use mc_03_block_production::{Block, BlockError, BlockSkeleton, Blockchain, PoWMiner};
use shared_crypto::Hash;
use shared_types::Transaction;

use crate::container::config::NodeConfig;
use crate::handlers::RpcHandler;

/// Central container holding the chain and the local miner.
pub struct NodeContainer {
    /// Every known block and the current heads.
    pub chain: Arc<RwLock<Blockchain>>,
    /// Nonce search for locally built blocks.
    pub miner: PoWMiner,
    /// Fee recipient for locally built blocks.
    pub miner_address: Hash,
}

impl NodeContainer {
    pub fn new(config: &NodeConfig) -> Self {
        info!(
            miner = %config.miner_address,
            difficulty = config.production.difficulty,
            threads = config.production.pow.threads,
            "initializing node container"
        );
        Self {
            chain: Arc::new(RwLock::new(Blockchain::new(config.production.clone()))),
            miner: PoWMiner::from_config(&config.production.pow),
            miner_address: config.miner_address,
        }
    }

    /// RPC handler sharing this container's chain.
    pub fn rpc(&self) -> RpcHandler {
        RpcHandler::new(Arc::clone(&self.chain))
    }

    /// Build, seal and insert a block on the canonical head.
    ///
    /// Builds genesis when the chain is empty. Blocking: call from a
    /// blocking task.
    #[instrument(skip_all, fields(txs = transactions.len()))]
    pub fn mine_block(&self, transactions: Vec<Transaction>, timestamp: u64) -> Result<Hash, BlockError> {
        let (parent, config): (Option<Block>, _) = {
            let chain = self.chain.read();
            (chain.canonical_head().cloned(), chain.config().clone())
        };
        let skeleton = BlockSkeleton::build(
            parent.as_ref(),
            transactions,
            self.miner_address,
            timestamp,
            &config,
        )?;
        let block = self.miner.seal(skeleton)?;
        self.chain.write().insert(block)
    }

    /// Seal genesis (if missing) and then `blocks` empty blocks.
    pub fn bootstrap(&self, blocks: u64) -> Result<(), BlockError> {
        if self.chain.read().is_empty() {
            self.mine_block(Vec::new(), now())?;
        }
        for _ in 0..blocks {
            self.mine_block(Vec::new(), now())?;
        }
        Ok(())
    }
}

/// Seconds since the Unix epoch.
pub fn now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
