//! Error types for block production

use mc_01_state_trie::{StateError, TrieError};
use mc_02_contract_vm::VmError;
use shared_crypto::Hash;
use shared_types::ValidationError;
use thiserror::Error;

/// Result type alias for block production operations
pub type Result<T> = std::result::Result<T, BlockError>;

/// Why a single transaction could not be applied to a state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// An output, input or the miner names an address absent from the state.
    #[error("account {address} not in state")]
    MissingAccount {
        /// Address that was looked up
        address: Hash,
    },

    /// The target's code aborted.
    #[error("script of {address} failed: {source}")]
    Script {
        /// Output target whose code ran
        address: Hash,
        /// VM failure
        #[source]
        source: VmError,
    },

    /// Debit or credit would leave a balance outside `u64`.
    #[error("balance of {address} out of range: {source}")]
    Balance {
        /// Account being updated
        address: Hash,
        /// Underlying range error
        #[source]
        source: ValidationError,
    },

    /// Value does not fit the VM's signed integers.
    #[error("value {value} too large for a balance delta")]
    ValueTooLarge {
        /// Offending value
        value: u64,
    },

    /// Backing state failure.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Errors that can occur while building, sealing or importing blocks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// A transaction has an input that is not signed by its owner.
    #[error("transaction {tx} is not signed")]
    Unsigned {
        /// Transaction hash
        tx: Hash,
    },

    /// The same transaction appears twice in one block.
    #[error("duplicate transaction {tx}")]
    DuplicateTransaction {
        /// Transaction hash
        tx: Hash,
    },

    /// A transaction failed to apply; the whole block is rejected.
    #[error("transaction {tx} rejected: {source}")]
    Transition {
        /// Transaction hash
        tx: Hash,
        /// Why it failed
        #[source]
        source: TransitionError,
    },

    /// `prev_block_hash` is not a known block.
    #[error("unknown parent block {0}")]
    UnknownParent(Hash),

    /// The received header differs from the one rebuilt from its parent.
    #[error("header mismatch: received {received}, rebuilt {rebuilt}")]
    HeaderMismatch {
        /// Hash of the received skeleton header
        received: Hash,
        /// Hash of the locally rebuilt skeleton header
        rebuilt: Hash,
    },

    /// Block hash is above the difficulty target.
    #[error("block {hash} does not meet difficulty {difficulty}")]
    InsufficientWork {
        /// Block hash
        hash: Hash,
        /// Required difficulty
        difficulty: u64,
    },

    /// Nonce search ran out of attempts.
    #[error("no valid nonce found in {attempts} attempts")]
    MiningFailed {
        /// Total attempts across all threads
        attempts: u64,
    },

    /// Height or accumulated difficulty overflowed.
    #[error("chain counter overflow")]
    Overflow,

    /// Record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Trie failure while building the transaction trie.
    #[error(transparent)]
    Trie(#[from] TrieError),

    /// Backing state failure.
    #[error(transparent)]
    State(#[from] StateError),
}
