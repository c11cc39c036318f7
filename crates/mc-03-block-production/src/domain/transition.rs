//! State transition
//!
//! `transit` applies one transaction to a state snapshot. Order is fixed:
//!
//! 1. outputs, in list order: run the target's code (if any), then credit
//! 2. inputs, in list order: debit (the null input is skipped)
//! 3. the fee goes to the miner
//!
//! Any failure rejects the transaction and leaves the input snapshot as it
//! was. Signatures are not checked here; block construction does that.

use crate::error::TransitionError;
use mc_01_state_trie::WorldState;
use mc_02_contract_vm::{Params, Vm, VmConfig};
use shared_crypto::Hash;
use shared_types::{Account, Transaction};
use tracing::{debug, trace};

/// Apply `tx` to `state`, paying its fee to `miner`.
pub fn transit(
    state: &WorldState,
    tx: &Transaction,
    miner: &Hash,
    vm_config: &VmConfig,
) -> Result<WorldState, TransitionError> {
    let data = tx.tx_data();
    let in_addresses: Vec<Hash> = data
        .inputs()
        .iter()
        .filter(|input| !input.is_null())
        .map(|input| input.address)
        .collect();

    let mut state = state.clone();

    for output in data.outputs() {
        let target = load(&state, &output.address)?;
        let amount = signed(output.value)?;

        if target.has_code() {
            trace!(target = %output.address, params = %output.params, "running output script");
            let script_error = |source| TransitionError::Script {
                address: output.address,
                source,
            };
            let result = Vm::new(
                state,
                Params::Script(output.params.clone()),
                target,
                &in_addresses,
                amount,
                *vm_config,
            )
            .and_then(Vm::run)
            .map_err(script_error)?;
            debug!(target = %output.address, retval = %result.retval, steps = result.steps, "output script finished");
            state = result.state;
        }

        state = credit(&state, &output.address, amount)?;
    }

    for input in data.inputs().iter().filter(|input| !input.is_null()) {
        state = credit(&state, &input.address, -signed(input.value)?)?;
    }

    credit(&state, miner, signed(data.fee())?)
}

fn load(state: &WorldState, address: &Hash) -> Result<Account, TransitionError> {
    state
        .get_account(address)?
        .ok_or(TransitionError::MissingAccount { address: *address })
}

/// Re-read `address` from `state`, apply `delta`, write it back.
fn credit(state: &WorldState, address: &Hash, delta: i64) -> Result<WorldState, TransitionError> {
    let account = load(state, address)?
        .add_to_balance(delta)
        .map_err(|source| TransitionError::Balance {
            address: *address,
            source,
        })?;
    Ok(state.put_account(&account)?)
}

fn signed(value: u64) -> Result<i64, TransitionError> {
    i64::try_from(value).map_err(|_| TransitionError::ValueTooLarge { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::genesis::{genesis_address, genesis_state};
    use mc_01_state_trie::InMemoryAccountStore;
    use shared_crypto::{derive_pubkey, keypair_from_seed, Keypair};
    use shared_types::{TransactionData, TransactionInput, TransactionOutput};
    use std::sync::Arc;

    fn keypair(seed: u64) -> Keypair {
        keypair_from_seed(seed)
    }

    fn funded(seed: u64, balance: u64, code: &str) -> Account {
        Account::new(derive_pubkey(&keypair(seed)), balance, code, false, vec![]).unwrap()
    }

    fn base_state(accounts: &[&Account]) -> WorldState {
        let state = genesis_state(Arc::new(InMemoryAccountStore::new())).unwrap();
        accounts
            .iter()
            .fold(state, |s, a| s.put_account(a).unwrap())
    }

    fn tx(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>, fee: u64) -> Transaction {
        Transaction::new(TransactionData::new(inputs, outputs, fee, Hash::ZERO).unwrap())
    }

    fn balance(state: &WorldState, account: &Account) -> u64 {
        state.get_account(&account.address()).unwrap().unwrap().balance()
    }

    #[test]
    fn test_plain_payment_with_fee() {
        let alice = funded(1, 10, "");
        let bob = funded(2, 0, "");
        let miner = funded(3, 0, "");
        let state = base_state(&[&alice, &bob, &miner]);

        let payment = tx(
            vec![TransactionInput::new(alice.address(), 7)],
            vec![TransactionOutput::new(bob.address(), 5, "")],
            2,
        );
        let next = transit(&state, &payment, &miner.address(), &VmConfig::default()).unwrap();

        assert_eq!(balance(&next, &alice), 3);
        assert_eq!(balance(&next, &bob), 5);
        assert_eq!(balance(&next, &miner), 2);
        // The input snapshot is untouched.
        assert_eq!(balance(&state, &alice), 10);
    }

    #[test]
    fn test_input_underflow_rejected() {
        let alice = funded(1, 3, "");
        let bob = funded(2, 0, "");
        let state = base_state(&[&alice, &bob]);

        let payment = tx(
            vec![TransactionInput::new(alice.address(), 5)],
            vec![TransactionOutput::new(bob.address(), 5, "")],
            0,
        );
        let err = transit(&state, &payment, &bob.address(), &VmConfig::default()).unwrap_err();
        assert!(matches!(err, TransitionError::Balance { address, .. } if address == alice.address()));
    }

    #[test]
    fn test_missing_output_and_miner() {
        let alice = funded(1, 3, "");
        let ghost = funded(9, 0, "");
        let state = base_state(&[&alice]);

        let to_ghost = tx(
            vec![TransactionInput::new(alice.address(), 1)],
            vec![TransactionOutput::new(ghost.address(), 1, "")],
            0,
        );
        assert_eq!(
            transit(&state, &to_ghost, &alice.address(), &VmConfig::default()).unwrap_err(),
            TransitionError::MissingAccount {
                address: ghost.address()
            }
        );

        let to_self = tx(
            vec![TransactionInput::new(alice.address(), 1)],
            vec![TransactionOutput::new(alice.address(), 1, "")],
            0,
        );
        assert_eq!(
            transit(&state, &to_self, &ghost.address(), &VmConfig::default()).unwrap_err(),
            TransitionError::MissingAccount {
                address: ghost.address()
            }
        );
    }

    #[test]
    fn test_output_runs_genesis_factory() {
        let child = derive_pubkey(&keypair(42));
        let create = tx(
            vec![TransactionInput::null()],
            vec![TransactionOutput::new(
                genesis_address(),
                0,
                format!("[] [] 1 '' k0x{}", child.to_hex()),
            )],
            0,
        );
        let state = base_state(&[]);
        let next = transit(&state, &create, &genesis_address(), &VmConfig::default()).unwrap();

        let created = next
            .get_account(&shared_crypto::address(&child))
            .unwrap()
            .unwrap();
        assert_eq!(created.balance(), 0);
        assert!(created.storage().is_empty());
        assert!(created.owner_access());
    }

    #[test]
    fn test_failing_script_rejects_transaction() {
        let alice = funded(1, 10, "");
        let trap = funded(2, 0, "OP_KILL");
        let state = base_state(&[&alice, &trap]);

        let payment = tx(
            vec![TransactionInput::new(alice.address(), 4)],
            vec![TransactionOutput::new(trap.address(), 4, "")],
            0,
        );
        let err = transit(&state, &payment, &alice.address(), &VmConfig::default()).unwrap_err();
        assert!(matches!(err, TransitionError::Script { .. }));
    }

    #[test]
    fn test_script_sees_funding_addresses() {
        let alice = funded(1, 10, "");
        // Stores the amount it was sent; -2 is the input address list.
        let vault = Account::new(
            derive_pubkey(&keypair(2)),
            0,
            "'last' -1 OP_PUSHR OP_SETSTOR -2 OP_PUSHR OP_RET",
            false,
            vec![shared_types::StorageItem::new("last", shared_types::StorageValue::Int(0))],
        )
        .unwrap();
        let state = base_state(&[&alice, &vault]);

        let payment = tx(
            vec![TransactionInput::new(alice.address(), 6)],
            vec![TransactionOutput::new(vault.address(), 6, "")],
            0,
        );
        let next = transit(&state, &payment, &alice.address(), &VmConfig::default()).unwrap();
        let stored = next.get_account(&vault.address()).unwrap().unwrap();
        assert_eq!(stored.get_storage("last"), Some(&shared_types::StorageValue::Int(6)));
        assert_eq!(stored.balance(), 6);
    }
}
