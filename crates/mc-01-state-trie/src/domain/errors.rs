use shared_crypto::Hash;
use shared_types::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    #[error("Pruned node at depth {depth} (hash {hash}) must be materialised")]
    PrunedNode { depth: usize, hash: Hash },

    #[error("Root mismatch: {left} != {right}")]
    RootMismatch { left: Hash, right: Hash },

    #[error("Leaf found above depth 64 (depth {depth})")]
    MalformedNode { depth: usize },

    #[error("Zero value cannot be stored (reserved for empty subtries)")]
    ZeroValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error(transparent)]
    Trie(#[from] TrieError),

    #[error("Account record {hash} for address {address} is not in the store")]
    MissingRecord { address: Hash, hash: Hash },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
