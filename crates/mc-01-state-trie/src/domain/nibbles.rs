use shared_crypto::Hash;

/// Depth of every leaf: one level per nibble of a 32-byte path.
pub const TRIE_DEPTH: usize = 64;

// =============================================================================
// NIBBLES: Half-byte path representation
// =============================================================================

/// Nibble path for trie traversal.
///
/// A 32-byte path becomes 64 nibbles, high nibble of each byte first.
/// `at(depth)` selects the child index at that level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nibbles([u8; TRIE_DEPTH]);

impl Nibbles {
    /// Split a 32-byte path into nibbles.
    pub fn from_path(path: &Hash) -> Self {
        let mut nibbles = [0u8; TRIE_DEPTH];
        for (i, byte) in path.as_bytes().iter().enumerate() {
            nibbles[2 * i] = byte >> 4;
            nibbles[2 * i + 1] = byte & 0x0F;
        }
        Nibbles(nibbles)
    }

    /// Reassemble the 32-byte path.
    pub fn to_path(&self) -> Hash {
        let mut bytes = [0u8; 32];
        for (i, pair) in self.0.chunks_exact(2).enumerate() {
            bytes[i] = (pair[0] << 4) | pair[1];
        }
        Hash::from_bytes(bytes)
    }

    /// Nibble at `depth` (0..64).
    pub fn at(&self, depth: usize) -> usize {
        self.0[depth] as usize
    }

    /// Overwrite the nibble at `depth`; used while walking the trie.
    pub fn set(&mut self, depth: usize, nibble: usize) {
        self.0[depth] = (nibble & 0x0F) as u8;
    }

    /// Length of the shared prefix with another path.
    pub fn common_prefix_len(&self, other: &Nibbles) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }
}

impl Default for Nibbles {
    fn default() -> Self {
        Nibbles([0u8; TRIE_DEPTH])
    }
}
