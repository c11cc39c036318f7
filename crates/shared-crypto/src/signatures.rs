//! # Ed25519 Keys and Signatures
//!
//! Twisted Edwards curve signatures with deterministic nonces.
//!
//! ## Fixed Lengths
//!
//! | Type | Bytes | Layout |
//! |------|-------|--------|
//! | `Pubkey` | 32 | compressed point |
//! | `Keypair` | 64 | secret seed ‖ public key |
//! | `Signature` | 64 | R ‖ s |
//!
//! All signing happens over an already-hashed document (the canonical JSON
//! hash), so a signature is a pure function of keypair and document.

use crate::{sha256, CryptoError, Hash};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::{rngs::StdRng, CryptoRng, RngCore, SeedableRng};
use std::fmt;
use zeroize::Zeroize;

crate::fixed_bytes! {
    /// Ed25519 public key (32 bytes).
    #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Pubkey(32);
}

crate::fixed_bytes! {
    /// Ed25519 signature (64 bytes). The zero value means "unsigned".
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Signature(64);
}

crate::fixed_bytes! {
    /// Ed25519 keypair: 32-byte secret seed followed by its 32-byte public key.
    #[derive(Clone, PartialEq, Eq, Hash)]
    pub struct Keypair(64);
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the public half is printed.
        write!(f, "Keypair(pub={})", hex::encode(&self.0[32..]))
    }
}

impl Drop for Keypair {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Pubkey {
    /// Check that the bytes decode to a curve point.
    pub fn validate(&self) -> Result<(), CryptoError> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(())
    }
}

impl Keypair {
    /// Check that the public half matches the secret seed.
    pub fn validate(&self) -> Result<(), CryptoError> {
        SigningKey::from_keypair_bytes(&self.0).map_err(|_| CryptoError::InvalidKeypair)?;
        Ok(())
    }

    fn signing_key(&self) -> SigningKey {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&self.0[..32]);
        let key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        key
    }
}

/// Derive the account address of a public key: `sha256(pubkey)`.
pub fn address(pubkey: &Pubkey) -> Hash {
    sha256(pubkey.as_bytes())
}

/// Derive the public key of a keypair from its secret seed.
pub fn derive_pubkey(keypair: &Keypair) -> Pubkey {
    Pubkey::from_bytes(keypair.signing_key().verifying_key().to_bytes())
}

/// Sign a document hash (deterministic - no RNG needed).
pub fn sign(keypair: &Keypair, message: &Hash) -> Signature {
    Signature::from_bytes(keypair.signing_key().sign(message.as_bytes()).to_bytes())
}

/// Verify a signature over a document hash.
///
/// Malformed keys and the zero signature simply fail verification.
pub fn verify(pubkey: &Pubkey, message: &Hash, signature: &Signature) -> bool {
    if signature.is_zero() {
        return false;
    }
    let Ok(verifying_key) = VerifyingKey::from_bytes(pubkey.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    verifying_key.verify(message.as_bytes(), &sig).is_ok()
}

/// Generate a fresh keypair.
pub fn generate_keypair<R: CryptoRng + RngCore>(rng: &mut R) -> Keypair {
    Keypair::from_bytes(SigningKey::generate(rng).to_keypair_bytes())
}

/// Deterministic keypair from an integer seed.
///
/// Same seed, same keypair, on every node.
pub fn keypair_from_seed(seed: u64) -> Keypair {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_keypair(&mut rng)
}
