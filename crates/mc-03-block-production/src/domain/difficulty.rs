//! Proof-of-work target
//!
//! A block is valid when its hash, read as a big-endian 256-bit integer, is
//! at most `⌊2²⁵⁶ / difficulty⌋`. The target is a CEILING: a higher
//! difficulty gives a lower target, and fewer hashes fall below it.
//!
//! `2²⁵⁶` itself does not fit in 256 bits, so the arithmetic is done in
//! `U512`.

use primitive_types::U512;
use shared_crypto::Hash;

/// `⌊2²⁵⁶ / difficulty⌋`. Difficulty 0 is treated as 1.
pub fn target(difficulty: u64) -> U512 {
    (U512::one() << 256) / U512::from(difficulty.max(1))
}

/// Hash bytes as a big-endian integer.
pub fn hash_to_u512(hash: &Hash) -> U512 {
    U512::from_big_endian(hash.as_bytes())
}

/// Returns true if `hash ≤ target(difficulty)`.
pub fn meets_target(hash: &Hash, difficulty: u64) -> bool {
    hash_to_u512(hash) <= target(difficulty)
}
