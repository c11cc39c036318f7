//! # Merkle Proofs
//!
//! A proof is the cherry-picked subtrie for a single path: the full route
//! from root to the leaf (or to the empty subtrie that proves absence),
//! with every sibling reduced to its hash.
//!
//! ## Verification
//!
//! `verify` rebuilds the root hash from the proof's own nodes rather than
//! trusting cached hashes, compares it with the expected root, and then
//! reads the value at the path.

use super::{MerkleTrie, TrieError};
use shared_crypto::Hash;

/// Inclusion or exclusion proof for one path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    path: Hash,
    subtrie: MerkleTrie,
}

impl MerkleProof {
    pub fn new(path: Hash, subtrie: MerkleTrie) -> Self {
        Self { path, subtrie }
    }

    pub fn path(&self) -> &Hash {
        &self.path
    }

    pub fn subtrie(&self) -> &MerkleTrie {
        &self.subtrie
    }

    /// Check the proof against `root`.
    ///
    /// Returns the proven value, or `None` for a valid exclusion proof.
    pub fn verify(&self, root: &Hash) -> Result<Option<Hash>, TrieError> {
        let computed = self.subtrie.root().recompute_hash();
        if computed != *root {
            return Err(TrieError::RootMismatch {
                left: computed,
                right: *root,
            });
        }
        self.subtrie.get(&self.path)
    }

    /// True if the proof shows the path present under `root`.
    pub fn is_inclusion(&self, root: &Hash) -> bool {
        matches!(self.verify(root), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::sha256;

    fn sample() -> MerkleTrie {
        (0u8..6).fold(MerkleTrie::empty(), |t, i| {
            t.put(&sha256(&[i]), sha256(&[i, i])).unwrap()
        })
    }

    #[test]
    fn test_inclusion_proof() {
        let trie = sample();
        let proof = trie.prove(&sha256(&[3])).unwrap();
        assert_eq!(proof.verify(&trie.root_hash()).unwrap(), Some(sha256(&[3, 3])));
        assert!(proof.is_inclusion(&trie.root_hash()));
    }

    #[test]
    fn test_exclusion_proof() {
        let trie = sample();
        let proof = trie.prove(&sha256(b"absent")).unwrap();
        assert_eq!(proof.verify(&trie.root_hash()).unwrap(), None);
        assert!(!proof.is_inclusion(&trie.root_hash()));
    }

    #[test]
    fn test_proof_against_wrong_root_fails() {
        let trie = sample();
        let proof = trie.prove(&sha256(&[1])).unwrap();
        let other = trie.put(&sha256(b"new"), sha256(b"x")).unwrap();
        assert!(matches!(
            proof.verify(&other.root_hash()),
            Err(TrieError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_proof_is_pruned() {
        let trie = sample();
        let proof = trie.prove(&sha256(&[0])).unwrap();
        assert_eq!(proof.subtrie().len(), 1);
        assert_eq!(proof.path(), &sha256(&[0]));
    }
}
