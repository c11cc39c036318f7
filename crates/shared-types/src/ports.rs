//! # Ports
//!
//! Lookups a record needs from its surroundings without depending on the
//! crates that own that data.

use shared_crypto::{Hash, Pubkey};
use std::collections::HashMap;

/// Resolves an account address to the public key registered for it.
///
/// Used when checking input signatures: the transaction only carries the
/// address, the key lives in the world state.
pub trait PubkeyResolver {
    /// The key of the account at `address`, or `None` if it is unknown.
    fn resolve_pubkey(&self, address: &Hash) -> Option<Pubkey>;
}

impl PubkeyResolver for HashMap<Hash, Pubkey> {
    fn resolve_pubkey(&self, address: &Hash) -> Option<Pubkey> {
        self.get(address).copied()
    }
}
