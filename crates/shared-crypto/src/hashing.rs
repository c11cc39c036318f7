//! # SHA-256 Hashing
//!
//! The single hash function of the chain. Trie nodes, account records,
//! transactions, blocks and addresses all hash with SHA-256.

use sha2::{Digest, Sha256};
use std::fmt;

crate::fixed_bytes! {
    /// 32-byte SHA-256 digest.
    ///
    /// The all-zero value is reserved as a sentinel (empty trie, null
    /// input, genesis parent).
    #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct Hash(32);
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Hash::from_bytes(Sha256::digest(data).into())
}

/// Hash the concatenation of several inputs.
pub fn sha256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    Hash::from_bytes(hasher.finalize().into())
}
