//! Domain entities for block production
//!
//! ```text
//! BlockSkeleton ── header: SkeletonHeader ──┐
//!   │  transactions (hash order)            │ serialised
//!   │  state (after every transaction)      ▼
//!   │  tx_trie                        BlockHeader { nonce, skeleton }
//!   ▼                                       │
//! Block { skeleton, nonce, hash } ◄─────────┘ hash = sha256(canonical JSON)
//! ```

use crate::config::BlockProductionConfig;
use crate::domain::difficulty::meets_target;
use crate::domain::genesis::genesis_state;
use crate::domain::transition::transit;
use crate::error::{BlockError, Result};
use mc_01_state_trie::{InMemoryAccountStore, MerkleTrie, WorldState};
use serde::{Deserialize, Serialize};
use shared_crypto::Hash;
use shared_types::{Record, Transaction};
use std::sync::Arc;
use tracing::{debug, warn};

/// Committed fields of a block, without the PoW nonce
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonHeader {
    /// Hash of the parent block, zero for genesis
    pub prev_block_hash: Hash,
    /// Seconds since the Unix epoch, chosen by the miner
    pub timestamp: u64,
    /// 1 for genesis
    pub height: u64,
    /// PoW difficulty of this block
    pub difficulty: u64,
    /// Sum of difficulties from genesis up to and including this block
    pub accumulated_difficulty: u64,
    /// Receives every transaction fee
    pub miner_address: Hash,
    /// Root of the state trie after all transactions
    pub state_root: Hash,
    /// Root of the `tx.hash → tx.hash` trie
    pub tx_root: Hash,
}

impl Record for SkeletonHeader {}

/// Serialised block: the skeleton header plus the nonce
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// PoW nonce
    pub nonce: Hash,
    /// Committed fields
    pub skeleton: SkeletonHeader,
}

impl Record for BlockHeader {}

impl BlockHeader {
    /// Returns true if this header's hash meets its own difficulty.
    pub fn meets_target(&self) -> bool {
        meets_target(&self.hash(), self.skeleton.difficulty)
    }
}

/// A candidate block: transactions applied, not yet sealed
#[derive(Clone, Debug)]
pub struct BlockSkeleton {
    header: SkeletonHeader,
    transactions: Vec<Transaction>,
    state: WorldState,
    tx_trie: MerkleTrie,
}

impl BlockSkeleton {
    /// Build the next block on `parent` (or a genesis block).
    ///
    /// Transactions are applied in ascending hash order. Each must be
    /// signed against the state just before it is applied; the first
    /// unsigned, duplicate or failing transaction rejects the block.
    ///
    /// Accounts written here stay on a fork of the parent state until the
    /// block is committed, so a rejected candidate adds nothing to the
    /// parent's store.
    #[tracing::instrument(skip_all, fields(txs = transactions.len(), miner = %miner))]
    pub fn build(
        parent: Option<&Block>,
        transactions: Vec<Transaction>,
        miner: Hash,
        timestamp: u64,
        config: &BlockProductionConfig,
    ) -> Result<Self> {
        let mut state = match parent {
            Some(parent) => parent.skeleton().state().fork(),
            None => genesis_state(Arc::new(InMemoryAccountStore::new()))?.fork(),
        };

        let mut ordered: Vec<(Hash, Transaction)> =
            transactions.into_iter().map(|tx| (tx.hash(), tx)).collect();
        ordered.sort_by_key(|(hash, _)| *hash);

        let mut tx_trie = MerkleTrie::empty();
        for (hash, tx) in &ordered {
            if tx_trie.contains(hash)? {
                warn!(tx = %hash, "duplicate transaction");
                return Err(BlockError::DuplicateTransaction { tx: *hash });
            }
            if !tx.is_signed(&state) {
                warn!(tx = %hash, "unsigned transaction");
                return Err(BlockError::Unsigned { tx: *hash });
            }
            state = transit(&state, tx, &miner, &config.vm).map_err(|source| {
                warn!(tx = %hash, error = %source, "transaction rejected");
                BlockError::Transition { tx: *hash, source }
            })?;
            tx_trie = tx_trie.put(hash, *hash)?;
        }

        let (prev_block_hash, height, accumulated_difficulty) = match parent {
            Some(parent) => {
                let prev = parent.skeleton().header();
                (
                    parent.hash(),
                    prev.height.checked_add(1).ok_or(BlockError::Overflow)?,
                    prev.accumulated_difficulty
                        .checked_add(config.difficulty)
                        .ok_or(BlockError::Overflow)?,
                )
            }
            None => (Hash::ZERO, 1, config.difficulty),
        };

        let header = SkeletonHeader {
            prev_block_hash,
            timestamp,
            height,
            difficulty: config.difficulty,
            accumulated_difficulty,
            miner_address: miner,
            state_root: state.root_hash(),
            tx_root: tx_trie.root_hash(),
        };
        debug!(height, state_root = %header.state_root, "skeleton built");

        Ok(Self {
            header,
            transactions: ordered.into_iter().map(|(_, tx)| tx).collect(),
            state,
            tx_trie,
        })
    }

    pub fn header(&self) -> &SkeletonHeader {
        &self.header
    }

    /// Transactions in application (hash) order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// State after every transaction.
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn tx_trie(&self) -> &MerkleTrie {
        &self.tx_trie
    }

    /// The block header this skeleton would have with `nonce`.
    pub fn with_nonce(&self, nonce: Hash) -> BlockHeader {
        BlockHeader {
            nonce,
            skeleton: self.header.clone(),
        }
    }
}

/// A sealed block
#[derive(Clone, Debug)]
pub struct Block {
    skeleton: BlockSkeleton,
    nonce: Hash,
    hash: Hash,
}

impl Block {
    /// Attach `nonce` to `skeleton`. Does not check the work.
    pub fn new(skeleton: BlockSkeleton, nonce: Hash) -> Self {
        let hash = skeleton.with_nonce(nonce).hash();
        Self {
            skeleton,
            nonce,
            hash,
        }
    }

    pub fn skeleton(&self) -> &BlockSkeleton {
        &self.skeleton
    }

    pub fn nonce(&self) -> &Hash {
        &self.nonce
    }

    /// `sha256(canonical_json(header))`.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn header(&self) -> BlockHeader {
        self.skeleton.with_nonce(self.nonce)
    }

    pub fn height(&self) -> u64 {
        self.skeleton.header.height
    }

    pub fn accumulated_difficulty(&self) -> u64 {
        self.skeleton.header.accumulated_difficulty
    }

    pub fn prev_block_hash(&self) -> &Hash {
        &self.skeleton.header.prev_block_hash
    }

    /// Returns true if the block hash is within its difficulty target.
    pub fn verify_pow(&self) -> bool {
        meets_target(&self.hash, self.skeleton.header.difficulty)
    }

    /// Write the accounts this block's state references into the parent's
    /// store and drop the rest of the fork.
    pub fn commit_state(mut self) -> Result<Self> {
        self.skeleton.state = self.skeleton.state.commit()?;
        Ok(self)
    }
}
