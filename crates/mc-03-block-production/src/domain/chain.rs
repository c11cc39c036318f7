//! Blockchain and fork choice
//!
//! Every known block is kept by hash. A *head* is a block with no known
//! child; importing a block replaces its parent in the head set. The
//! canonical head is the head with the largest accumulated difficulty,
//! ties going to the smaller hash.

use crate::config::BlockProductionConfig;
use crate::domain::entities::{Block, BlockHeader, BlockSkeleton};
use crate::error::{BlockError, Result};
use shared_crypto::Hash;
use shared_types::{Record, Transaction};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Known blocks and their heads
#[derive(Debug, Default)]
pub struct Blockchain {
    blocks: HashMap<Hash, Block>,
    heads: HashSet<Hash>,
    config: BlockProductionConfig,
}

impl Blockchain {
    pub fn new(config: BlockProductionConfig) -> Self {
        Self {
            blocks: HashMap::new(),
            heads: HashSet::new(),
            config,
        }
    }

    pub fn config(&self) -> &BlockProductionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.blocks.contains_key(hash)
    }

    /// Hashes of all blocks without a known child.
    pub fn heads(&self) -> impl Iterator<Item = &Hash> {
        self.heads.iter()
    }

    /// Head with the largest accumulated difficulty (smaller hash on ties).
    pub fn canonical_head(&self) -> Option<&Block> {
        self.heads
            .iter()
            .filter_map(|hash| self.blocks.get(hash))
            .max_by_key(|block| (block.accumulated_difficulty(), Reverse(block.hash())))
    }

    /// `hash` and its ancestors, newest first, back to genesis.
    pub fn ancestors(&self, hash: &Hash) -> Vec<&Block> {
        let mut chain = Vec::new();
        let mut cursor = self.blocks.get(hash);
        while let Some(block) = cursor {
            chain.push(block);
            cursor = self.blocks.get(block.prev_block_hash());
        }
        chain
    }

    /// Parent of a block with `prev_block_hash`; `None` for genesis.
    fn parent(&self, prev_block_hash: &Hash) -> Result<Option<&Block>> {
        if prev_block_hash.is_zero() {
            return Ok(None);
        }
        self.blocks
            .get(prev_block_hash)
            .map(Some)
            .ok_or(BlockError::UnknownParent(*prev_block_hash))
    }

    /// Add a locally sealed block.
    ///
    /// The block must meet its difficulty and its parent must be known.
    pub fn insert(&mut self, block: Block) -> Result<Hash> {
        let hash = block.hash();
        if !block.verify_pow() {
            return Err(BlockError::InsufficientWork {
                hash,
                difficulty: block.skeleton().header().difficulty,
            });
        }
        self.parent(block.prev_block_hash())?;

        if self.blocks.contains_key(&hash) {
            debug!(%hash, "block already known");
            return Ok(hash);
        }
        let block = block.commit_state()?;

        let prev = *block.prev_block_hash();
        self.heads.remove(&prev);
        self.heads.insert(hash);
        info!(
            %hash,
            height = block.height(),
            accumulated_difficulty = block.accumulated_difficulty(),
            "block accepted"
        );
        self.blocks.insert(hash, block);
        Ok(hash)
    }

    /// Validate a received block and add it.
    ///
    /// The skeleton is rebuilt from the parent with the header's miner and
    /// timestamp; the result must reproduce the received header exactly.
    #[tracing::instrument(skip_all, fields(height = header.skeleton.height))]
    pub fn import(&mut self, header: BlockHeader, transactions: Vec<Transaction>) -> Result<Hash> {
        let result = self.rebuild(&header, transactions);
        match result {
            Ok(block) => self.insert(block),
            Err(err) => {
                warn!(error = %err, "block rejected");
                Err(err)
            }
        }
    }

    fn rebuild(&self, header: &BlockHeader, transactions: Vec<Transaction>) -> Result<Block> {
        let received = &header.skeleton;
        let parent = self.parent(&received.prev_block_hash)?;
        let skeleton = BlockSkeleton::build(
            parent,
            transactions,
            received.miner_address,
            received.timestamp,
            &self.config,
        )?;

        if skeleton.header() != received {
            return Err(BlockError::HeaderMismatch {
                received: received.hash(),
                rebuilt: skeleton.header().hash(),
            });
        }

        let block = Block::new(skeleton, header.nonce);
        if !block.verify_pow() {
            return Err(BlockError::InsufficientWork {
                hash: block.hash(),
                difficulty: received.difficulty,
            });
        }
        Ok(block)
    }
}
