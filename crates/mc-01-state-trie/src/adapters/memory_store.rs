use crate::ports::AccountStore;
use parking_lot::RwLock;
use shared_crypto::Hash;
use shared_types::{Account, Record};
use std::collections::HashMap;

/// In-memory implementation of AccountStore
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Hash, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, hash: &Hash) -> Option<Account> {
        self.accounts.read().get(hash).cloned()
    }

    fn insert(&self, account: Account) -> Hash {
        let hash = account.hash();
        self.accounts.write().entry(hash).or_insert(account);
        hash
    }

    fn len(&self) -> usize {
        self.accounts.read().len()
    }

    fn contains(&self, hash: &Hash) -> bool {
        self.accounts.read().contains_key(hash)
    }
}
