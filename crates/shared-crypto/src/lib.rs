//! # Shared Crypto - Fixed-Length Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Trie nodes, records, addresses, PoW |
//! | `signatures` | Ed25519 | Transaction input signing |
//! | `bytes` | - | Length-checked newtypes with hex encoding |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency for signing
//! - **Keypair**: secret half zeroized on drop, never printed
//! - **Addresses**: `sha256(pubkey)`, so identity is content-derived

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bytes;
pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many, Hash};
pub use signatures::{
    address, derive_pubkey, generate_keypair, keypair_from_seed, sign, verify, Keypair, Pubkey,
    Signature,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
