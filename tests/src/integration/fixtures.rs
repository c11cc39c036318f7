//! Shared fixtures for the integration tests and benchmarks.

use std::sync::Arc;

use mc_01_state_trie::{InMemoryAccountStore, WorldState};
use mc_03_block_production::{
    genesis_address, genesis_state, Block, BlockError, BlockProductionConfig, BlockSkeleton,
    PoWConfig, PoWMiner,
};
use shared_crypto::{derive_pubkey, keypair_from_seed, Hash, Keypair, Pubkey};
use shared_types::{Account, Transaction, TransactionData, TransactionInput, TransactionOutput};

/// `gcd(a, b)` by recursive `OP_CALL`; params are `a b`.
pub const GCD_CODE: &str = "
    -2 OP_PUSHR -1 OP_PUSHR 8 OP_CALL OP_RET
    -1 OP_PUSHR 0 OP_EQU 24 OP_JUMPC
    -1 OP_PUSHR -2 OP_PUSHR -1 OP_PUSHR OP_MOD
    8 OP_CALL OP_RET
    -2 OP_PUSHR OP_RET
";

/// Transfers `amount` to the address in its first param and returns the
/// transfer's status.
pub fn transfer_code(amount: i64) -> String {
    format!("[] -1 OP_PUSHR {amount} OP_TRANSFER OP_RET")
}

pub fn keypair(seed: u64) -> Keypair {
    keypair_from_seed(seed)
}

pub fn pubkey(seed: u64) -> Pubkey {
    derive_pubkey(&keypair(seed))
}

/// Account owned by the key derived from `seed`.
pub fn account(seed: u64, balance: u64, code: &str) -> Account {
    Account::new(pubkey(seed), balance, code, false, Vec::new()).expect("fixture account is valid")
}

/// Genesis state plus `accounts`.
pub fn state_with(accounts: &[&Account]) -> WorldState {
    let genesis = genesis_state(Arc::new(InMemoryAccountStore::new())).expect("genesis state");
    accounts.iter().fold(genesis, |state, account| {
        state.put_account(account).expect("fixture account fits the trie")
    })
}

/// Production config at `difficulty`, sealing on two threads.
pub fn config(difficulty: u64) -> BlockProductionConfig {
    BlockProductionConfig {
        difficulty,
        pow: PoWConfig {
            threads: 2,
            max_attempts: 10_000_000,
        },
        ..BlockProductionConfig::default()
    }
}

/// Build and seal a block on `parent` with genesis as the miner.
pub fn mine(
    parent: Option<&Block>,
    transactions: Vec<Transaction>,
    timestamp: u64,
    config: &BlockProductionConfig,
) -> Result<Block, BlockError> {
    let skeleton = BlockSkeleton::build(parent, transactions, genesis_address(), timestamp, config)?;
    PoWMiner::from_config(&config.pow).seal(skeleton)
}

/// Transaction asking the genesis factory to install `owner` with no code or
/// storage.
pub fn create_account_tx(owner: &Pubkey) -> Transaction {
    let data = TransactionData::new(
        vec![TransactionInput::null()],
        vec![TransactionOutput::new(
            genesis_address(),
            0,
            format!("[] [] 1 '' k0x{}", owner.to_hex()),
        )],
        0,
        Hash::ZERO,
    )
    .expect("factory call is balanced");
    Transaction::new(data)
}

/// `from` pays `value` to `to`, signed by `from`'s key.
pub fn payment(from_seed: u64, to: Hash, value: u64) -> Transaction {
    let from = shared_crypto::address(&pubkey(from_seed));
    let data = TransactionData::new(
        vec![TransactionInput::new(from, value)],
        vec![TransactionOutput::new(to, value, "")],
        0,
        TransactionData::random_nonce(&mut rand::thread_rng()),
    )
    .expect("payment is balanced");
    Transaction::new(data)
        .sign(0, &keypair(from_seed))
        .expect("fixture key owns the input")
}
