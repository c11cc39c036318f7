use super::{Nibbles, TrieError, TRIE_DEPTH};
use shared_crypto::{sha256_many, Hash};
use std::sync::Arc;

// =============================================================================
// TRIE NODE: The four node states of the 16-ary trie
// =============================================================================

/// Shared child pointer. Unchanged subtries are shared between versions.
pub type NodeRef = Arc<TrieNode>;

/// Node of the depth-64 hexary Merkle trie.
///
/// - `Empty` hashes to the zero sentinel.
/// - `Leaf` sits at depth 64; its hash is the stored value.
/// - `Branch` has exactly 16 children; `hash = H(child0 ‖ … ‖ child15)`.
/// - `Unknown` is a pruned subtrie of which only the hash is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrieNode {
    Empty,
    Leaf(Hash),
    Branch {
        hash: Hash,
        children: Box<[NodeRef; 16]>,
    },
    Unknown(Hash),
}

impl TrieNode {
    pub fn empty() -> NodeRef {
        Arc::new(TrieNode::Empty)
    }

    /// Summary node for a subtrie; the zero hash is the empty subtrie.
    pub fn unknown(hash: Hash) -> NodeRef {
        if hash.is_zero() {
            Self::empty()
        } else {
            Arc::new(TrieNode::Unknown(hash))
        }
    }

    /// Branch over `children`, collapsing to `Empty` when none is populated.
    pub fn branch(children: [NodeRef; 16]) -> NodeRef {
        if children.iter().all(|c| c.is_empty()) {
            return Self::empty();
        }
        let hash = hash_children(&children);
        Arc::new(TrieNode::Branch {
            hash,
            children: Box::new(children),
        })
    }

    pub fn hash(&self) -> Hash {
        match self {
            TrieNode::Empty => Hash::ZERO,
            TrieNode::Leaf(value) => *value,
            TrieNode::Branch { hash, .. } => *hash,
            TrieNode::Unknown(hash) => *hash,
        }
    }

    /// Hash rebuilt from the materialised children, ignoring cached values.
    pub fn recompute_hash(&self) -> Hash {
        match self {
            TrieNode::Branch { children, .. } => {
                let hashes: Vec<Hash> = children.iter().map(|c| c.recompute_hash()).collect();
                let parts: Vec<&[u8]> = hashes.iter().map(|h| h.as_ref()).collect();
                sha256_many(&parts)
            }
            other => other.hash(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TrieNode::Empty)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TrieNode::Unknown(_))
    }

    /// Children to descend into at `depth`, materialising an empty node as
    /// sixteen empty children.
    pub(crate) fn children_at(&self, depth: usize) -> Result<[NodeRef; 16], TrieError> {
        match self {
            TrieNode::Empty => Ok(std::array::from_fn(|_| Self::empty())),
            TrieNode::Branch { children, .. } => Ok((**children).clone()),
            TrieNode::Unknown(hash) => Err(TrieError::PrunedNode { depth, hash: *hash }),
            TrieNode::Leaf(_) => Err(TrieError::MalformedNode { depth }),
        }
    }

    /// Collect every known leaf below this node, in path order.
    pub(crate) fn collect_leaves(&self, depth: usize, path: &mut Nibbles, out: &mut Vec<(Hash, Hash)>) {
        match self {
            TrieNode::Leaf(value) if depth == TRIE_DEPTH => out.push((path.to_path(), *value)),
            TrieNode::Branch { children, .. } if depth < TRIE_DEPTH => {
                for (nibble, child) in children.iter().enumerate() {
                    path.set(depth, nibble);
                    child.collect_leaves(depth + 1, path, out);
                }
            }
            _ => {}
        }
    }
}

fn hash_children(children: &[NodeRef; 16]) -> Hash {
    let hashes: [Hash; 16] = std::array::from_fn(|i| children[i].hash());
    let parts: [&[u8]; 16] = std::array::from_fn(|i| hashes[i].as_ref());
    sha256_many(&parts)
}
