//! # Error Types
//!
//! Static-invariant violations on records. Callers do not retry these.

use shared_crypto::{CryptoError, Hash};
use thiserror::Error;

/// A record violates one of its construction invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A fixed-length field has the wrong shape.
    #[error("Invalid field `{field}`: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: CryptoError,
    },

    /// Balance would drop below zero (or overflow).
    #[error("Balance out of range: balance {balance}, delta {delta}")]
    BalanceOutOfRange { balance: u64, delta: i64 },

    /// Storage slot value does not match its declared tag.
    #[error("Storage item `{name}` expects {expected}, got {actual}")]
    StorageTypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Two storage slots share a name.
    #[error("Duplicate storage name: {0}")]
    DuplicateStorageName(String),

    /// No storage slot with that name.
    #[error("Unknown storage slot: {0}")]
    UnknownStorageSlot(String),

    /// Input value conservation fails: Σ in − Σ out ≠ fee.
    #[error("Fee mismatch: inputs {inputs} - outputs {outputs} != fee {fee}")]
    FeeMismatch { inputs: u64, outputs: u64, fee: u64 },

    /// Value sums overflow u64.
    #[error("Value overflow while summing {0}")]
    ValueOverflow(&'static str),

    /// Transaction has no outputs.
    #[error("Transaction must have at least one output")]
    NoOutputs,

    /// Null address used with a non-zero value.
    #[error("Input {index}: zero address requires zero value, got {value}")]
    InvalidNullInput { index: usize, value: u64 },

    /// Signature count differs from input count.
    #[error("Signature count mismatch: {signatures} signatures for {inputs} inputs")]
    SignatureCountMismatch { inputs: usize, signatures: usize },

    /// Signing index past the end of the inputs.
    #[error("Input index {index} out of range ({len} inputs)")]
    InputIndexOutOfRange { index: usize, len: usize },

    /// Keypair does not own the input address.
    #[error("Signer mismatch for input {index}: keypair address {signer}, input address {expected}")]
    SignerMismatch {
        index: usize,
        signer: Hash,
        expected: Hash,
    },

    /// Canonical JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
