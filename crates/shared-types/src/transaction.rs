//! # Transactions
//!
//! A transaction moves value from signed inputs to outputs and pays the
//! difference to the miner as a fee:
//!
//! ```text
//! Σ inputs.value − Σ outputs.value = fee
//! ```
//!
//! Each output carries `params`, a literal fragment pushed onto the target
//! contract's stack before its code runs.
//!
//! Signatures cover `hash(tx_data)`; the transaction hash covers the
//! signatures too, so re-signing changes the identity of a transaction.

use crate::{PubkeyResolver, Record, ValidationError};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use shared_crypto::{address, derive_pubkey, sign, verify, Hash, Keypair, Signature};

/// Debit `value` from the account at `address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub address: Hash,
    pub value: u64,
}

impl TransactionInput {
    pub fn new(address: Hash, value: u64) -> Self {
        Self { address, value }
    }

    /// The reserved input that debits nothing and needs no signature.
    pub fn null() -> Self {
        Self::new(Hash::ZERO, 0)
    }

    pub fn is_null(&self) -> bool {
        self.address.is_zero() && self.value == 0
    }
}

/// Credit `value` to the account at `address`, running its code with `params`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub address: Hash,
    pub params: String,
    pub value: u64,
}

impl TransactionOutput {
    pub fn new(address: Hash, value: u64, params: impl Into<String>) -> Self {
        Self {
            address,
            params: params.into(),
            value,
        }
    }
}

/// The signed body of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    fee: u64,
    inputs: Vec<TransactionInput>,
    nonce: Hash,
    outputs: Vec<TransactionOutput>,
}

impl TransactionData {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        fee: u64,
        nonce: Hash,
    ) -> Result<Self, ValidationError> {
        let data = Self {
            fee,
            inputs,
            nonce,
            outputs,
        };
        data.validate()?;
        Ok(data)
    }

    /// Fresh 32-byte nonce so otherwise identical transfers hash differently.
    pub fn random_nonce<R: RngCore>(rng: &mut R) -> Hash {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Hash::from_bytes(bytes)
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn nonce(&self) -> &Hash {
        &self.nonce
    }
}

fn checked_sum(mut values: impl Iterator<Item = u64>, what: &'static str) -> Result<u64, ValidationError> {
    values.try_fold(0u64, |acc, v| {
        acc.checked_add(v).ok_or(ValidationError::ValueOverflow(what))
    })
}

impl Record for TransactionData {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.outputs.is_empty() {
            return Err(ValidationError::NoOutputs);
        }
        for (index, input) in self.inputs.iter().enumerate() {
            if input.address.is_zero() && input.value != 0 {
                return Err(ValidationError::InvalidNullInput {
                    index,
                    value: input.value,
                });
            }
        }

        let inputs = checked_sum(self.inputs.iter().map(|i| i.value), "inputs")?;
        let outputs = checked_sum(self.outputs.iter().map(|o| o.value), "outputs")?;
        if inputs.checked_sub(outputs) != Some(self.fee) {
            return Err(ValidationError::FeeMismatch {
                inputs,
                outputs,
                fee: self.fee,
            });
        }
        Ok(())
    }
}

/// Transaction body plus one signature per input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    signatures: Vec<Signature>,
    tx_data: TransactionData,
}

impl Transaction {
    /// Unsigned transaction: every signature is the zero sentinel.
    pub fn new(tx_data: TransactionData) -> Self {
        Self {
            signatures: vec![Signature::ZERO; tx_data.inputs.len()],
            tx_data,
        }
    }

    pub fn with_signatures(
        tx_data: TransactionData,
        signatures: Vec<Signature>,
    ) -> Result<Self, ValidationError> {
        let tx = Self {
            signatures,
            tx_data,
        };
        tx.validate()?;
        Ok(tx)
    }

    pub fn tx_data(&self) -> &TransactionData {
        &self.tx_data
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// New transaction with input `index` signed by `keypair`.
    pub fn sign(&self, index: usize, keypair: &Keypair) -> Result<Self, ValidationError> {
        let input = self
            .tx_data
            .inputs
            .get(index)
            .ok_or(ValidationError::InputIndexOutOfRange {
                index,
                len: self.tx_data.inputs.len(),
            })?;

        let signer = address(&derive_pubkey(keypair));
        if signer != input.address {
            return Err(ValidationError::SignerMismatch {
                index,
                signer,
                expected: input.address,
            });
        }

        let mut signatures = self.signatures.clone();
        signatures[index] = sign(keypair, &self.tx_data.hash());
        Ok(Self {
            signatures,
            tx_data: self.tx_data.clone(),
        })
    }

    /// Whether input `index` carries a valid signature.
    ///
    /// The null input is always considered signed.
    pub fn input_signed<R: PubkeyResolver + ?Sized>(&self, index: usize, resolver: &R) -> bool {
        let (Some(input), Some(signature)) =
            (self.tx_data.inputs.get(index), self.signatures.get(index))
        else {
            return false;
        };
        if input.is_null() {
            return true;
        }
        match resolver.resolve_pubkey(&input.address) {
            Some(pubkey) => {
                address(&pubkey) == input.address
                    && verify(&pubkey, &self.tx_data.hash(), signature)
            }
            None => false,
        }
    }

    /// True iff every input is signed.
    pub fn is_signed<R: PubkeyResolver + ?Sized>(&self, resolver: &R) -> bool {
        (0..self.tx_data.inputs.len()).all(|index| self.input_signed(index, resolver))
    }
}

impl Record for Transaction {
    fn validate(&self) -> Result<(), ValidationError> {
        self.tx_data.validate()?;
        if self.signatures.len() != self.tx_data.inputs.len() {
            return Err(ValidationError::SignatureCountMismatch {
                inputs: self.tx_data.inputs.len(),
                signatures: self.signatures.len(),
            });
        }
        Ok(())
    }
}
