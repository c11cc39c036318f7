//! Write buffer over another account store.
//!
//! Reads fall through to the base store; writes stay in the overlay until
//! [`WorldState::commit`](crate::WorldState::commit) copies the records its
//! trie still references into the base. Dropping the overlay discards every
//! other write.

use crate::ports::AccountStore;
use parking_lot::RwLock;
use shared_crypto::Hash;
use shared_types::{Account, Record};
use std::collections::HashMap;
use std::sync::Arc;

pub struct OverlayAccountStore {
    base: Arc<dyn AccountStore>,
    pending: RwLock<HashMap<Hash, Account>>,
}

impl OverlayAccountStore {
    pub fn new(base: Arc<dyn AccountStore>) -> Self {
        Self {
            base,
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Records written here and not yet in the base.
    pub fn pending_len(&self) -> usize {
        self.pending.read().len()
    }
}

impl AccountStore for OverlayAccountStore {
    fn get(&self, hash: &Hash) -> Option<Account> {
        if let Some(account) = self.pending.read().get(hash) {
            return Some(account.clone());
        }
        self.base.get(hash)
    }

    fn insert(&self, account: Account) -> Hash {
        let hash = account.hash();
        if !self.base.contains(&hash) {
            self.pending.write().entry(hash).or_insert(account);
        }
        hash
    }

    fn len(&self) -> usize {
        self.base.len() + self.pending_len()
    }

    fn contains(&self, hash: &Hash) -> bool {
        self.pending.read().contains_key(hash) || self.base.contains(hash)
    }

    fn base(&self) -> Option<&Arc<dyn AccountStore>> {
        Some(&self.base)
    }
}
