use shared_crypto::Hash;
use shared_types::Account;
use std::sync::Arc;

/// Content-addressed account record store.
///
/// The trie maps addresses to account hashes; the store maps those hashes
/// back to the records. Entries are immutable and keyed by their own hash,
/// so one store can back any number of forked states.
pub trait AccountStore: Send + Sync {
    fn get(&self, hash: &Hash) -> Option<Account>;

    /// Insert a record and return its hash. Re-inserting is a no-op.
    fn insert(&self, account: Account) -> Hash;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, hash: &Hash) -> bool {
        self.get(hash).is_some()
    }

    /// Store that pending writes are committed into, if this is an overlay.
    fn base(&self) -> Option<&Arc<dyn AccountStore>> {
        None
    }
}
