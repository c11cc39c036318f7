//! # End-to-End Scenarios
//!
//! Whole-chain behaviour from genesis through contract execution:
//!
//! 1. Genesis-only block
//! 2. Ten sealed empty blocks on genesis
//! 3. Account creation through the genesis factory
//! 4. A recursive GCD contract
//! 5. Input underflow and runaway scripts rejecting their block
//! 6. An unfunded `OP_TRANSFER` cancelling without side effects

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;

    use mc_01_state_trie::AccountStore;
    use mc_02_contract_vm::{Params, Value, Vm, VmConfig};
    use mc_03_block_production::{
        genesis_address, meets_target, transit, BlockError, BlockProductionConfig,
        BlockSkeleton, Blockchain, TransitionError, DEFAULT_DIFFICULTY, GENESIS_CODE,
    };
    use shared_crypto::{address, Hash};
    use shared_types::{Transaction, TransactionData, TransactionInput, TransactionOutput};

    // =========================================================================
    // 1. GENESIS
    // =========================================================================

    #[test]
    fn test_genesis_only_state() {
        let skeleton =
            BlockSkeleton::build(None, vec![], Hash::ZERO, 0, &BlockProductionConfig::default())
                .unwrap();
        let header = skeleton.header();

        assert_eq!(header.height, 1);
        assert_eq!(header.prev_block_hash, Hash::ZERO);
        assert_eq!(header.accumulated_difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(skeleton.state().trie().len(), 1);
        assert!(skeleton.state().contains(&genesis_address()).unwrap());
        assert!(skeleton.tx_trie().is_empty());
        assert_eq!(header.state_root, skeleton.state().root_hash());

        let genesis = skeleton.state().get_account(&genesis_address()).unwrap().unwrap();
        assert_eq!(genesis.code(), GENESIS_CODE);
    }

    // =========================================================================
    // 2. MINING
    // =========================================================================

    #[test]
    fn test_mine_empty_chain_of_ten() {
        let config = config(DEFAULT_DIFFICULTY);
        let mut chain = Blockchain::new(config.clone());
        let genesis = mine(None, vec![], 0, &config).unwrap();
        let mut tip = genesis.clone();
        chain.insert(genesis).unwrap();

        for timestamp in 1..=10 {
            let block = mine(Some(&tip), vec![], timestamp, &config).unwrap();
            assert!(meets_target(&block.hash(), DEFAULT_DIFFICULTY));
            assert_eq!(block.height(), tip.height() + 1);
            assert_eq!(block.prev_block_hash(), &tip.hash());
            chain.insert(block.clone()).unwrap();
            tip = block;
        }

        let head = chain.canonical_head().unwrap();
        assert_eq!(head.hash(), tip.hash());
        assert_eq!(head.height(), 11);
        assert_eq!(head.accumulated_difficulty(), 11 * DEFAULT_DIFFICULTY);
        // Empty blocks leave the genesis state untouched.
        assert_eq!(
            head.skeleton().header().state_root,
            chain.ancestors(&head.hash()).last().unwrap().skeleton().header().state_root
        );
    }

    // =========================================================================
    // 3. ACCOUNT CREATION
    // =========================================================================

    #[test]
    fn test_create_child_account() {
        let config = config(16);
        let genesis = mine(None, vec![], 0, &config).unwrap();
        let child = pubkey(42);

        let block = mine(Some(&genesis), vec![create_account_tx(&child)], 1, &config).unwrap();
        let state = block.skeleton().state();

        assert!(state.contains(&address(&child)).unwrap());
        let created = state.get_account(&address(&child)).unwrap().unwrap();
        assert_eq!(created.balance(), 0);
        assert!(created.storage().is_empty());
        assert!(!created.has_code());
        assert_eq!(block.skeleton().tx_trie().len(), 1);
    }

    // =========================================================================
    // 4. CONTRACT EXECUTION
    // =========================================================================

    #[test]
    fn test_gcd_contract() {
        let contract = account(7, 0, GCD_CODE);
        let state = state_with(&[&contract]);

        let result = Vm::new(
            state.clone(),
            Params::Script("120 16".into()),
            contract,
            &[],
            0,
            VmConfig::default(),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(result.retval, Value::Int(8));
        assert_eq!(result.state.root_hash(), state.root_hash());
    }

    // =========================================================================
    // 5. UNDERFLOW
    // =========================================================================

    #[test]
    fn test_input_underflow_rejected_by_transition() {
        let alice = account(1, 3, "");
        let bob = account(2, 0, "");
        let state = state_with(&[&alice, &bob]);

        let err = transit(
            &state,
            &payment(1, bob.address(), 5),
            &genesis_address(),
            &VmConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransitionError::Balance { address, .. } if address == alice.address()
        ));
    }

    #[test]
    fn test_input_underflow_rejects_block() {
        let config = config(16);
        let genesis = mine(None, vec![], 0, &config).unwrap();
        let funded = mine(
            Some(&genesis),
            vec![create_account_tx(&pubkey(1)), create_account_tx(&pubkey(2))],
            1,
            &config,
        )
        .unwrap();

        let overspend = payment(1, address(&pubkey(2)), 5);
        let err = BlockSkeleton::build(
            Some(&funded),
            vec![overspend.clone()],
            genesis_address(),
            2,
            &config,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            BlockError::Transition {
                tx,
                source: TransitionError::Balance { .. },
            } if tx == shared_types::Record::hash(&overspend)
        ));
    }

    #[test]
    fn test_rejected_script_adds_no_records() {
        let mut config = config(16);
        config.vm = VmConfig {
            max_steps: 2_000,
            ..VmConfig::default()
        };
        // Counts up in storage until it runs out of steps.
        let counter = r#"'"n" "n" OP_GETSTOR 1 OP_ADD OP_SETSTOR 1 OP_JUMP'"#;
        let owner = pubkey(11);
        let install = Transaction::new(
            TransactionData::new(
                vec![TransactionInput::null()],
                vec![TransactionOutput::new(
                    genesis_address(),
                    0,
                    format!("[0] ['n'] 1 {counter} k0x{}", owner.to_hex()),
                )],
                0,
                Hash::ZERO,
            )
            .unwrap(),
        );

        let mut chain = Blockchain::new(config.clone());
        let genesis = chain.insert(mine(None, vec![], 0, &config).unwrap()).unwrap();
        let parent = mine(chain.get(&genesis), vec![install], 1, &config).unwrap();
        let parent = chain.insert(parent).unwrap();
        let parent = chain.get(&parent).unwrap();
        let store = parent.skeleton().state().store().clone();
        let before = store.len();

        let call = Transaction::new(
            TransactionData::new(
                vec![TransactionInput::null()],
                vec![TransactionOutput::new(address(&owner), 0, "")],
                0,
                Hash::ZERO,
            )
            .unwrap(),
        );
        let err = BlockSkeleton::build(Some(parent), vec![call], genesis_address(), 2, &config)
            .unwrap_err();
        assert!(matches!(
            err,
            BlockError::Transition {
                source: TransitionError::Script { .. },
                ..
            }
        ));
        assert_eq!(store.len(), before);
    }

    // =========================================================================
    // 6. TRANSFER CANCELLATION
    // =========================================================================

    #[test]
    fn test_transfer_cancels_cleanly() {
        let contract = account(1, 2, &transfer_code(10));
        let target = account(2, 5, "");
        let state = state_with(&[&contract, &target]);

        let result = Vm::new(
            state.clone(),
            Params::Values(vec![Value::Hash(target.address())]),
            contract.clone(),
            &[],
            0,
            VmConfig::default(),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(result.retval, Value::Int(0));
        assert_eq!(result.state.root_hash(), state.root_hash());
        let balance = |hash: &Hash| result.state.get_account(hash).unwrap().unwrap().balance();
        assert_eq!(balance(&contract.address()), 2);
        assert_eq!(balance(&target.address()), 5);
    }
}
