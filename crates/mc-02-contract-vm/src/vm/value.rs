//! # Stack Values
//!
//! The VM stack is heterogeneous. Every opcode names the tags it expects;
//! anything else is a `TypeMismatch`.

use crate::errors::VmError;
use shared_crypto::{Hash, Keypair, Pubkey, Signature};
use shared_types::{canonical_json, StorageValue};
use std::fmt;

/// A typed stack value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Hash(Hash),
    Signature(Signature),
    Pubkey(Pubkey),
    Keypair(Keypair),
}

impl Value {
    /// Tag name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Hash(_) => "hash",
            Value::Signature(_) => "signature",
            Value::Pubkey(_) => "pubkey",
            Value::Keypair(_) => "keypair",
        }
    }

    /// Number of values this one holds, itself included: 1 for a scalar,
    /// one more than the sizes of its elements for a list.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Value::List(items) => items
                .iter()
                .fold(1usize, |total, item| total.saturating_add(item.size())),
            _ => 1,
        }
    }

    /// Bytes hashed by `OP_HASH`.
    ///
    /// Integers hash their decimal text, strings their UTF-8, byte types
    /// their raw bytes and lists their canonical JSON.
    pub fn hash_preimage(&self) -> Result<Vec<u8>, VmError> {
        Ok(match self {
            Value::Int(v) => v.to_string().into_bytes(),
            Value::Str(s) => s.as_bytes().to_vec(),
            Value::Hash(h) => h.as_bytes().to_vec(),
            Value::Signature(s) => s.as_bytes().to_vec(),
            Value::Pubkey(k) => k.as_bytes().to_vec(),
            Value::Keypair(k) => k.as_bytes().to_vec(),
            Value::List(_) => canonical_json(&self.to_json())?.into_bytes(),
        })
    }

    /// JSON form: byte types as lowercase hex.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int(v) => (*v).into(),
            Value::Str(s) => s.as_str().into(),
            Value::List(items) => items.iter().map(Value::to_json).collect(),
            Value::Hash(h) => h.to_hex().into(),
            Value::Signature(s) => s.to_hex().into(),
            Value::Pubkey(k) => k.to_hex().into(),
            Value::Keypair(k) => k.to_hex().into(),
        }
    }

    /// Convert into a storable value; lists cannot be stored.
    pub fn into_storage(self, opcode: &'static str) -> Result<StorageValue, VmError> {
        Ok(match self {
            Value::Int(v) => StorageValue::Int(v),
            Value::Str(s) => StorageValue::Str(s),
            Value::Hash(h) => StorageValue::Hash(h),
            Value::Signature(s) => StorageValue::Signature(s),
            Value::Pubkey(k) => StorageValue::Pubkey(k),
            Value::Keypair(k) => StorageValue::Keypair(k),
            Value::List(_) => {
                return Err(VmError::TypeMismatch {
                    opcode,
                    expected: "storable value",
                    actual: "list",
                })
            }
        })
    }
}

impl From<StorageValue> for Value {
    fn from(value: StorageValue) -> Self {
        match value {
            StorageValue::Int(v) => Value::Int(v),
            StorageValue::Str(s) => Value::Str(s),
            StorageValue::Hash(h) => Value::Hash(h),
            StorageValue::Signature(s) => Value::Signature(s),
            StorageValue::Pubkey(k) => Value::Pubkey(k),
            StorageValue::Keypair(k) => Value::Keypair(k),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Int(i64::from(v))
    }
}

impl fmt::Display for Value {
    /// Program-text form. Parsing it back yields the same value for every
    /// variant except `Keypair`, which is redacted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Hash(h) => write!(f, "h0x{}", h.to_hex()),
            Value::Pubkey(k) => write!(f, "k0x{}", k.to_hex()),
            Value::Signature(s) => write!(f, "s0x{}", s.to_hex()),
            Value::Keypair(_) => f.write_str("p0x<redacted>"),
        }
    }
}
