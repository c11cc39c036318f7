//! # Accounts and Typed Storage
//!
//! An account is an immutable record addressed by `sha256(pub_key)`.
//! Every mutation (`add_to_balance`, `set_storage`) returns a new account.
//!
//! ## Storage
//!
//! Storage is an ordered list of named, typed slots. The order observed at
//! construction is preserved and `set_storage` replaces a slot in place, so
//! changing one value changes nothing else in the canonical JSON.

use crate::{Record, ValidationError};
use serde::{Deserialize, Serialize};
use shared_crypto::{address, Hash, Keypair, Pubkey, Signature};
use std::collections::HashSet;
use std::fmt;

/// Storage slot type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Int,
    Str,
    Hash,
    Signature,
    Pubkey,
    Keypair,
}

impl StorageType {
    /// Tag name as it appears in JSON.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Hash => "hash",
            Self::Signature => "signature",
            Self::Pubkey => "pubkey",
            Self::Keypair => "keypair",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A well-typed storage value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageValue {
    Int(i64),
    Str(String),
    Hash(Hash),
    Signature(Signature),
    Pubkey(Pubkey),
    Keypair(Keypair),
}

impl StorageValue {
    /// The tag this value satisfies.
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::Int(_) => StorageType::Int,
            Self::Str(_) => StorageType::Str,
            Self::Hash(_) => StorageType::Hash,
            Self::Signature(_) => StorageType::Signature,
            Self::Pubkey(_) => StorageType::Pubkey,
            Self::Keypair(_) => StorageType::Keypair,
        }
    }

    fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Str(s) => serde_json::Value::from(s.as_str()),
            Self::Hash(h) => h.to_hex().into(),
            Self::Signature(s) => s.to_hex().into(),
            Self::Pubkey(k) => k.to_hex().into(),
            Self::Keypair(k) => k.to_hex().into(),
        }
    }

    fn from_json_value(
        name: &str,
        tag: StorageType,
        value: &serde_json::Value,
    ) -> Result<Self, ValidationError> {
        let mismatch = |actual: &'static str| ValidationError::StorageTypeMismatch {
            name: name.to_string(),
            expected: tag.name(),
            actual,
        };
        let kind = json_kind(value);
        let text = || value.as_str().ok_or_else(|| mismatch(kind));
        let invalid = |source| ValidationError::InvalidField {
            field: "s_value",
            source,
        };

        match tag {
            StorageType::Int => value.as_i64().map(Self::Int).ok_or_else(|| mismatch(kind)),
            StorageType::Str => Ok(Self::Str(text()?.to_string())),
            StorageType::Hash => Hash::from_hex(text()?).map(Self::Hash).map_err(invalid),
            StorageType::Signature => Signature::from_hex(text()?)
                .map(Self::Signature)
                .map_err(invalid),
            StorageType::Pubkey => Pubkey::from_hex(text()?).map(Self::Pubkey).map_err(invalid),
            StorageType::Keypair => Keypair::from_hex(text()?).map(Self::Keypair).map_err(invalid),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "int",
        serde_json::Value::String(_) => "str",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

/// One named storage slot: `{s_name, s_type, s_value}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStorageItem", into = "RawStorageItem")]
pub struct StorageItem {
    name: String,
    value: StorageValue,
}

#[derive(Serialize, Deserialize)]
struct RawStorageItem {
    s_name: String,
    s_type: StorageType,
    s_value: serde_json::Value,
}

impl TryFrom<RawStorageItem> for StorageItem {
    type Error = ValidationError;

    fn try_from(raw: RawStorageItem) -> Result<Self, Self::Error> {
        let value = StorageValue::from_json_value(&raw.s_name, raw.s_type, &raw.s_value)?;
        Ok(Self {
            name: raw.s_name,
            value,
        })
    }
}

impl From<StorageItem> for RawStorageItem {
    fn from(item: StorageItem) -> Self {
        Self {
            s_type: item.value.storage_type(),
            s_value: item.value.to_json_value(),
            s_name: item.name,
        }
    }
}

impl StorageItem {
    pub fn new(name: impl Into<String>, value: StorageValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_type(&self) -> StorageType {
        self.value.storage_type()
    }

    pub fn value(&self) -> &StorageValue {
        &self.value
    }
}

/// An immutable account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub_key: Pubkey,
    balance: u64,
    code: String,
    owner_access: bool,
    storage: Vec<StorageItem>,
}

impl Account {
    /// Build an account, checking the public key and storage names.
    pub fn new(
        pub_key: Pubkey,
        balance: u64,
        code: impl Into<String>,
        owner_access: bool,
        storage: Vec<StorageItem>,
    ) -> Result<Self, ValidationError> {
        let account = Self {
            pub_key,
            balance,
            code: code.into(),
            owner_access,
            storage,
        };
        account.validate()?;
        Ok(account)
    }

    pub fn pub_key(&self) -> &Pubkey {
        &self.pub_key
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// True when the account runs a script on receipt of value.
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }

    pub fn owner_access(&self) -> bool {
        self.owner_access
    }

    pub fn storage(&self) -> &[StorageItem] {
        &self.storage
    }

    /// `sha256(pub_key)`.
    pub fn address(&self) -> Hash {
        address(&self.pub_key)
    }

    /// New account with `balance + delta`.
    ///
    /// Fails if the result would be negative or overflow.
    pub fn add_to_balance(&self, delta: i64) -> Result<Self, ValidationError> {
        let balance = self
            .balance
            .checked_add_signed(delta)
            .ok_or(ValidationError::BalanceOutOfRange {
                balance: self.balance,
                delta,
            })?;
        Ok(Self {
            balance,
            ..self.clone()
        })
    }

    /// New account with slot `name` replaced in place.
    pub fn set_storage(&self, name: &str, value: StorageValue) -> Result<Self, ValidationError> {
        let index = self
            .storage
            .iter()
            .position(|item| item.name == name)
            .ok_or_else(|| ValidationError::UnknownStorageSlot(name.to_string()))?;

        let expected = self.storage[index].storage_type();
        if value.storage_type() != expected {
            return Err(ValidationError::StorageTypeMismatch {
                name: name.to_string(),
                expected: expected.name(),
                actual: value.storage_type().name(),
            });
        }

        let mut storage = self.storage.clone();
        storage[index] = StorageItem::new(name, value);
        Ok(Self {
            storage,
            ..self.clone()
        })
    }

    pub fn get_storage(&self, name: &str) -> Option<&StorageValue> {
        self.storage
            .iter()
            .find(|item| item.name == name)
            .map(StorageItem::value)
    }
}

impl Record for Account {
    fn validate(&self) -> Result<(), ValidationError> {
        self.pub_key
            .validate()
            .map_err(|source| ValidationError::InvalidField {
                field: "pub_key",
                source,
            })?;

        let mut seen = HashSet::with_capacity(self.storage.len());
        for item in &self.storage {
            if !seen.insert(item.name.as_str()) {
                return Err(ValidationError::DuplicateStorageName(item.name.clone()));
            }
            if let StorageValue::Keypair(keypair) = &item.value {
                keypair
                    .validate()
                    .map_err(|source| ValidationError::InvalidField {
                        field: "s_value",
                        source,
                    })?;
            }
        }
        Ok(())
    }
}
