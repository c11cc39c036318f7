use super::{MerkleProof, Nibbles, NodeRef, TrieError, TrieNode, TRIE_DEPTH};
use shared_crypto::Hash;
use std::sync::Arc;

/// Persistent 16-ary Merkle trie keyed by 32-byte paths.
///
/// Every update returns a new trie sharing all untouched subtries with the
/// old one, so cloning and forking are O(1).
///
/// ## Pruning
///
/// `cherry_pick` keeps only the paths of interest and replaces everything
/// else with `Unknown` hash summaries; `merge` fills summaries back in from
/// another trie with the same root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTrie {
    root: NodeRef,
}

impl Default for MerkleTrie {
    fn default() -> Self {
        Self::empty()
    }
}

impl MerkleTrie {
    pub fn empty() -> Self {
        Self {
            root: TrieNode::empty(),
        }
    }

    /// A trie known only by its root hash.
    pub fn from_root_hash(hash: Hash) -> Self {
        Self {
            root: TrieNode::unknown(hash),
        }
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    pub fn root_hash(&self) -> Hash {
        self.root.hash()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Insert or overwrite the value at `path`.
    pub fn put(&self, path: &Hash, value: Hash) -> Result<Self, TrieError> {
        if value.is_zero() {
            return Err(TrieError::ZeroValue);
        }
        let nibbles = Nibbles::from_path(path);
        Ok(Self {
            root: put_node(&self.root, &nibbles, 0, value)?,
        })
    }

    /// Remove the leaf at `path`; the flag says whether one was there.
    pub fn remove(&self, path: &Hash) -> Result<(Self, bool), TrieError> {
        let nibbles = Nibbles::from_path(path);
        match remove_node(&self.root, &nibbles, 0)? {
            Some(root) => Ok((Self { root }, true)),
            None => Ok((self.clone(), false)),
        }
    }

    pub fn get(&self, path: &Hash) -> Result<Option<Hash>, TrieError> {
        let nibbles = Nibbles::from_path(path);
        let mut node = &self.root;
        for depth in 0..TRIE_DEPTH {
            match node.as_ref() {
                TrieNode::Empty => return Ok(None),
                TrieNode::Branch { children, .. } => node = &children[nibbles.at(depth)],
                TrieNode::Unknown(hash) => {
                    return Err(TrieError::PrunedNode { depth, hash: *hash })
                }
                TrieNode::Leaf(_) => return Err(TrieError::MalformedNode { depth }),
            }
        }
        match node.as_ref() {
            TrieNode::Leaf(value) => Ok(Some(*value)),
            TrieNode::Empty => Ok(None),
            TrieNode::Unknown(hash) => Err(TrieError::PrunedNode {
                depth: TRIE_DEPTH,
                hash: *hash,
            }),
            TrieNode::Branch { .. } => Err(TrieError::MalformedNode { depth: TRIE_DEPTH }),
        }
    }

    pub fn contains(&self, path: &Hash) -> Result<bool, TrieError> {
        Ok(self.get(path)?.is_some())
    }

    /// Minimal subtrie holding the full root-to-leaf route of every path.
    ///
    /// Everything off those routes becomes an `Unknown` summary, so the root
    /// hash is unchanged. Paths that are absent keep the route down to the
    /// empty subtrie that proves their absence.
    pub fn cherry_pick(&self, paths: &[Hash]) -> Result<Self, TrieError> {
        let nibbles: Vec<Nibbles> = paths.iter().map(Nibbles::from_path).collect();
        let refs: Vec<&Nibbles> = nibbles.iter().collect();
        Ok(Self {
            root: pick_node(&self.root, &refs, 0)?,
        })
    }

    /// Union of two views of the same trie.
    ///
    /// Symmetric and idempotent; fails if the root hashes differ.
    pub fn merge(&self, other: &Self) -> Result<Self, TrieError> {
        Ok(Self {
            root: merge_nodes(&self.root, &other.root)?,
        })
    }

    /// Inclusion or exclusion proof for `path`.
    pub fn prove(&self, path: &Hash) -> Result<MerkleProof, TrieError> {
        Ok(MerkleProof::new(*path, self.cherry_pick(std::slice::from_ref(path))?))
    }

    /// Every known `(path, value)` pair in ascending path order.
    pub fn leaves(&self) -> Vec<(Hash, Hash)> {
        let mut out = Vec::new();
        let mut path = Nibbles::default();
        self.root.collect_leaves(0, &mut path, &mut out);
        out
    }

    /// Number of known leaves.
    pub fn len(&self) -> usize {
        self.leaves().len()
    }
}

fn put_node(node: &NodeRef, path: &Nibbles, depth: usize, value: Hash) -> Result<NodeRef, TrieError> {
    if depth == TRIE_DEPTH {
        if let TrieNode::Leaf(existing) = node.as_ref() {
            if *existing == value {
                return Ok(Arc::clone(node));
            }
        }
        return Ok(Arc::new(TrieNode::Leaf(value)));
    }

    let mut children = node.children_at(depth)?;
    let nibble = path.at(depth);
    let child = put_node(&children[nibble], path, depth + 1, value)?;
    if Arc::ptr_eq(&child, &children[nibble]) {
        return Ok(Arc::clone(node));
    }
    children[nibble] = child;
    Ok(TrieNode::branch(children))
}

/// `None` when nothing was removed.
fn remove_node(node: &NodeRef, path: &Nibbles, depth: usize) -> Result<Option<NodeRef>, TrieError> {
    match node.as_ref() {
        TrieNode::Empty => Ok(None),
        TrieNode::Unknown(hash) => Err(TrieError::PrunedNode { depth, hash: *hash }),
        TrieNode::Leaf(_) if depth == TRIE_DEPTH => Ok(Some(TrieNode::empty())),
        TrieNode::Leaf(_) => Err(TrieError::MalformedNode { depth }),
        TrieNode::Branch { .. } if depth == TRIE_DEPTH => {
            Err(TrieError::MalformedNode { depth })
        }
        TrieNode::Branch { .. } => {
            let mut children = node.children_at(depth)?;
            let nibble = path.at(depth);
            match remove_node(&children[nibble], path, depth + 1)? {
                Some(child) => {
                    children[nibble] = child;
                    Ok(Some(TrieNode::branch(children)))
                }
                None => Ok(None),
            }
        }
    }
}

fn pick_node(node: &NodeRef, paths: &[&Nibbles], depth: usize) -> Result<NodeRef, TrieError> {
    if paths.is_empty() {
        return Ok(TrieNode::unknown(node.hash()));
    }
    match node.as_ref() {
        TrieNode::Empty | TrieNode::Leaf(_) => Ok(Arc::clone(node)),
        TrieNode::Unknown(hash) => Err(TrieError::PrunedNode { depth, hash: *hash }),
        TrieNode::Branch { hash, children } => {
            let picked: [NodeRef; 16] = {
                let mut picked: [NodeRef; 16] = std::array::from_fn(|_| TrieNode::empty());
                for (nibble, slot) in picked.iter_mut().enumerate() {
                    let below: Vec<&Nibbles> = paths
                        .iter()
                        .copied()
                        .filter(|p| p.at(depth) == nibble)
                        .collect();
                    *slot = pick_node(&children[nibble], &below, depth + 1)?;
                }
                picked
            };
            Ok(Arc::new(TrieNode::Branch {
                hash: *hash,
                children: Box::new(picked),
            }))
        }
    }
}

fn merge_nodes(left: &NodeRef, right: &NodeRef) -> Result<NodeRef, TrieError> {
    if left.hash() != right.hash() {
        return Err(TrieError::RootMismatch {
            left: left.hash(),
            right: right.hash(),
        });
    }
    match (left.as_ref(), right.as_ref()) {
        (TrieNode::Unknown(_), _) => Ok(Arc::clone(right)),
        (_, TrieNode::Unknown(_)) => Ok(Arc::clone(left)),
        (
            TrieNode::Branch { hash, children: l },
            TrieNode::Branch { children: r, .. },
        ) => {
            let mut merged: [NodeRef; 16] = std::array::from_fn(|_| TrieNode::empty());
            for (i, slot) in merged.iter_mut().enumerate() {
                *slot = merge_nodes(&l[i], &r[i])?;
            }
            Ok(Arc::new(TrieNode::Branch {
                hash: *hash,
                children: Box::new(merged),
            }))
        }
        (TrieNode::Leaf(_), TrieNode::Leaf(_)) | (TrieNode::Empty, TrieNode::Empty) => {
            Ok(Arc::clone(left))
        }
        _ => Err(TrieError::RootMismatch {
            left: left.hash(),
            right: right.hash(),
        }),
    }
}
