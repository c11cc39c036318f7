//! Genesis state
//!
//! The first block's state holds exactly one account: a factory contract
//! that turns its five params into a new account. Sending it an output with
//! params `storage_values storage_names owner code pubkey` installs that
//! account with balance 0.

use mc_01_state_trie::{AccountStore, StateError, WorldState};
use shared_crypto::{address, Hash, Pubkey};
use shared_types::{Account, ValidationError};
use std::sync::Arc;

/// Ed25519 public key of the genesis account, lowercase hex.
///
/// This is the chain's own 32-byte key. It does not reproduce the PEM key
/// of other deployments, so their genesis addresses differ from this one.
pub const GENESIS_PUBKEY_HEX: &str =
    "ae2f6b317a092d722226eb8437f38b250f29ac22f9d189512adde4ddf921c319";

/// Factory code installed at the genesis address.
pub const GENESIS_CODE: &str =
    "-5 OP_PUSHR -4 OP_PUSHR -3 OP_PUSHR -2 OP_PUSHR -1 OP_PUSHR OP_CREATECONTR OP_RET";

/// The genesis public key.
pub fn genesis_pubkey() -> Pubkey {
    Pubkey::from_hex(GENESIS_PUBKEY_HEX).expect("genesis pubkey constant is valid hex")
}

/// `sha256(genesis_pubkey)`.
pub fn genesis_address() -> Hash {
    address(&genesis_pubkey())
}

/// The genesis factory account.
pub fn genesis_account() -> Result<Account, ValidationError> {
    Account::new(genesis_pubkey(), 0, GENESIS_CODE, false, Vec::new())
}

/// Fresh state containing only the genesis account.
pub fn genesis_state(store: Arc<dyn AccountStore>) -> Result<WorldState, StateError> {
    WorldState::new(store).put_account(&genesis_account()?)
}
