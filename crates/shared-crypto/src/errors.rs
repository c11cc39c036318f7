//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Byte string has the wrong fixed length
    #[error("Invalid length for {kind}: expected {expected}, got {actual}")]
    InvalidLength {
        /// Name of the fixed-length type
        kind: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Input is not lowercase/uppercase hex
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Public key bytes are not a valid curve point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Keypair secret and public halves disagree
    #[error("Invalid keypair: public half does not match secret seed")]
    InvalidKeypair,
}
