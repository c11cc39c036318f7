//! # World State
//!
//! The state trie maps `address → hash(account)`; the account records live
//! in a shared [`AccountStore`]. A `WorldState` is an immutable snapshot:
//! `put_account` returns a new snapshot and leaves this one untouched, so
//! candidate blocks and nested contract calls can fork freely.
//!
//! Records are only ever added to a store. Work that may be thrown away runs
//! on a [`fork`](WorldState::fork), whose writes land in an overlay; a
//! [`commit`](WorldState::commit) moves just the records the final trie
//! references into the shared store.

use super::{MerkleTrie, StateError};
use crate::adapters::{InMemoryAccountStore, OverlayAccountStore};
use crate::ports::AccountStore;
use shared_crypto::{Hash, Pubkey};
use shared_types::{Account, PubkeyResolver};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct WorldState {
    trie: MerkleTrie,
    store: Arc<dyn AccountStore>,
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldState")
            .field("root", &self.trie.root_hash())
            .finish()
    }
}

impl PartialEq for WorldState {
    /// Snapshots are equal when their roots are.
    fn eq(&self, other: &Self) -> bool {
        self.root_hash() == other.root_hash()
    }
}

impl Eq for WorldState {}

impl Default for WorldState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryAccountStore::new()))
    }
}

impl WorldState {
    /// Empty state backed by `store`.
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            trie: MerkleTrie::empty(),
            store,
        }
    }

    /// Existing trie backed by `store`.
    pub fn from_trie(trie: MerkleTrie, store: Arc<dyn AccountStore>) -> Self {
        Self { trie, store }
    }

    pub fn trie(&self) -> &MerkleTrie {
        &self.trie
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    pub fn root_hash(&self) -> Hash {
        self.trie.root_hash()
    }

    pub fn contains(&self, address: &Hash) -> Result<bool, StateError> {
        Ok(self.trie.contains(address)?)
    }

    pub fn get_account(&self, address: &Hash) -> Result<Option<Account>, StateError> {
        let Some(hash) = self.trie.get(address)? else {
            return Ok(None);
        };
        self.store
            .get(&hash)
            .map(Some)
            .ok_or(StateError::MissingRecord {
                address: *address,
                hash,
            })
    }

    /// New snapshot with `account` stored under its address.
    pub fn put_account(&self, account: &Account) -> Result<Self, StateError> {
        let hash = self.store.insert(account.clone());
        Ok(Self {
            trie: self.trie.put(&account.address(), hash)?,
            store: Arc::clone(&self.store),
        })
    }

    /// Same snapshot, writing into a fresh overlay over this store.
    pub fn fork(&self) -> Self {
        Self {
            trie: self.trie.clone(),
            store: Arc::new(OverlayAccountStore::new(Arc::clone(&self.store))),
        }
    }

    /// Copy the records this trie references into the store at the bottom
    /// of the overlay chain and return the snapshot backed by that store.
    ///
    /// A state not backed by an overlay is returned unchanged.
    pub fn commit(&self) -> Result<Self, StateError> {
        let mut root = &self.store;
        while let Some(base) = root.base() {
            root = base;
        }
        if Arc::ptr_eq(root, &self.store) {
            return Ok(self.clone());
        }
        for (address, hash) in self.trie.leaves() {
            if root.contains(&hash) {
                continue;
            }
            let account = self
                .store
                .get(&hash)
                .ok_or(StateError::MissingRecord { address, hash })?;
            root.insert(account);
        }
        Ok(Self::from_trie(self.trie.clone(), Arc::clone(root)))
    }

    /// All accounts, in address order.
    pub fn accounts(&self) -> Result<Vec<Account>, StateError> {
        self.trie
            .leaves()
            .into_iter()
            .map(|(address, hash)| {
                self.store
                    .get(&hash)
                    .ok_or(StateError::MissingRecord { address, hash })
            })
            .collect()
    }
}

impl PubkeyResolver for WorldState {
    fn resolve_pubkey(&self, address: &Hash) -> Option<Pubkey> {
        self.get_account(address)
            .ok()
            .flatten()
            .map(|account| *account.pub_key())
    }
}
