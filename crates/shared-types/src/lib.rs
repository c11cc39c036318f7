//! # Shared Types Crate
//!
//! Records shared by every subsystem: accounts with typed storage,
//! transactions, and the canonical JSON form that all of their hashes are
//! taken over.
//!
//! ## Design Principles
//!
//! - **Value objects**: records are immutable; updates return new records.
//! - **Content addressing**: a record's identity is `sha256(canonical_json)`.
//! - **Validated construction**: constructors and `Record::from_json` both
//!   run the same invariant checks.

pub mod account;
pub mod codec;
pub mod errors;
pub mod ports;
pub mod transaction;

pub use account::{Account, StorageItem, StorageType, StorageValue};
pub use codec::{canonical_hash, canonical_json, Record};
pub use errors::ValidationError;
pub use ports::PubkeyResolver;
pub use transaction::{Transaction, TransactionData, TransactionInput, TransactionOutput};

pub use shared_crypto::{Hash, Keypair, Pubkey, Signature};
