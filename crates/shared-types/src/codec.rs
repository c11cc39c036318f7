//! # Canonical JSON
//!
//! Every persisted or hashed record is hashed over one deterministic text
//! form:
//!
//! - object keys sorted lexicographically
//! - integers in decimal
//! - byte strings as lowercase hex without prefix
//! - no insignificant whitespace
//!
//! Records go through `serde_json::Value`, whose object map is a `BTreeMap`
//! (the `preserve_order` feature must stay off workspace-wide), so key order
//! is independent of field declaration order.

use crate::ValidationError;
use serde::{de::DeserializeOwned, Serialize};
use shared_crypto::{sha256, Hash};

/// Encode a value as canonical JSON.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ValidationError> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&value)?)
}

/// SHA-256 of the canonical JSON form.
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<Hash, ValidationError> {
    Ok(sha256(canonical_json(value)?.as_bytes()))
}

/// Decode any record from JSON text.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, ValidationError> {
    Ok(serde_json::from_str(json)?)
}

/// A chain record: content-addressed by the hash of its canonical JSON.
///
/// Records are built only from strings, integers, booleans and hex byte
/// strings, none of which `serde_json` can reject.
pub trait Record: Serialize + DeserializeOwned {
    /// Canonical JSON text of this record.
    fn to_json(&self) -> String {
        canonical_json(self).expect("records contain only JSON-representable fields")
    }

    /// Content hash: `sha256(canonical_json(self))`.
    fn hash(&self) -> Hash {
        sha256(self.to_json().as_bytes())
    }

    /// Parse a record and re-run its construction checks.
    fn from_json(json: &str) -> Result<Self, ValidationError> {
        let record: Self = crate::codec::from_json(json)?;
        record.validate()?;
        Ok(record)
    }

    /// Construction invariants (run after deserialisation).
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
