//! # Record Encoding
//!
//! Canonical JSON round-trips across crates and signature binding to the
//! transaction body.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;

    use mc_03_block_production::{genesis_account, BlockHeader, Blockchain};
    use proptest::prelude::*;
    use shared_crypto::{address, Hash};
    use shared_types::{
        Account, Record, StorageItem, StorageValue, Transaction, TransactionData,
        TransactionInput, TransactionOutput,
    };

    #[test]
    fn test_account_round_trip() {
        let account = Account::new(
            pubkey(3),
            17,
            "'n' OP_GETSTOR OP_RET",
            true,
            vec![
                StorageItem::new("n", StorageValue::Int(-4)),
                StorageItem::new("owner", StorageValue::Hash(address(&pubkey(4)))),
            ],
        )
        .unwrap();
        let json = account.to_json();
        let decoded = Account::from_json(&json).unwrap();
        assert_eq!(decoded, account);
        assert_eq!(decoded.to_json(), json);

        let genesis = genesis_account().unwrap();
        assert_eq!(Account::from_json(&genesis.to_json()).unwrap(), genesis);
    }

    #[test]
    fn test_block_header_round_trip() {
        let config = config(8);
        let genesis = mine(None, vec![], 0, &config).unwrap();
        let block = mine(Some(&genesis), vec![create_account_tx(&pubkey(5))], 1, &config).unwrap();

        let header = BlockHeader::from_json(&block.header().to_json()).unwrap();
        assert_eq!(header, block.header());
        assert_eq!(header.hash(), block.hash());

        // A block travels as header plus transactions and is rebuilt on import.
        let txs_json = serde_json::to_string(block.skeleton().transactions()).unwrap();
        let txs: Vec<Transaction> = serde_json::from_str(&txs_json).unwrap();
        let mut replica = Blockchain::new(config);
        replica.import(genesis.header(), vec![]).unwrap();
        assert_eq!(replica.import(header, txs).unwrap(), block.hash());
        assert_eq!(
            replica.get(&block.hash()).unwrap().skeleton().state().root_hash(),
            block.skeleton().state().root_hash()
        );
    }

    #[test]
    fn test_decoded_transaction_revalidated() {
        let json = r#"{"signatures":[],"tx_data":{"fee":1,"inputs":[],"nonce":"0000000000000000000000000000000000000000000000000000000000000000","outputs":[{"address":"0000000000000000000000000000000000000000000000000000000000000000","params":"","value":0}]}}"#;
        assert!(Transaction::from_json(json).is_err());
    }

    #[test]
    fn test_tampered_body_invalidates_signatures() {
        let alice = account(1, 10, "");
        let bob = account(2, 10, "");
        let state = state_with(&[&alice, &bob]);

        let data = TransactionData::new(
            vec![
                TransactionInput::new(alice.address(), 4),
                TransactionInput::new(bob.address(), 2),
            ],
            vec![TransactionOutput::new(alice.address(), 5, "")],
            1,
            Hash::ZERO,
        )
        .unwrap();
        let signed = Transaction::new(data)
            .sign(0, &keypair(1))
            .unwrap()
            .sign(1, &keypair(2))
            .unwrap();
        assert!(signed.is_signed(&state));

        let tampered = TransactionData::new(
            signed.tx_data().inputs().to_vec(),
            vec![TransactionOutput::new(bob.address(), 5, "")],
            1,
            Hash::ZERO,
        )
        .unwrap();
        let forged = Transaction::with_signatures(tampered, signed.signatures().to_vec()).unwrap();
        assert!(!forged.input_signed(0, &state));
        assert!(!forged.input_signed(1, &state));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_any_nonce_change_breaks_signature(byte in 0usize..32, flip in 1u8..=255) {
            let alice = account(1, 10, "");
            let state = state_with(&[&alice]);
            let signed = payment(1, alice.address(), 3);
            prop_assert!(signed.is_signed(&state));

            let mut nonce = *signed.tx_data().nonce().as_bytes();
            nonce[byte] ^= flip;
            let data = TransactionData::new(
                signed.tx_data().inputs().to_vec(),
                signed.tx_data().outputs().to_vec(),
                signed.tx_data().fee(),
                Hash::from_bytes(nonce),
            )
            .unwrap();
            let forged = Transaction::with_signatures(data, signed.signatures().to_vec()).unwrap();
            prop_assert!(!forged.is_signed(&state));
        }
    }
}
