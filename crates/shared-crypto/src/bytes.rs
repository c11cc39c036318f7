//! # Fixed-Length Byte Types
//!
//! Every cryptographic value in the chain has a fixed, checkable length.
//! `fixed_bytes!` generates the shared plumbing: length-checked
//! construction, hex parsing, and hex (de)serialisation. The external form
//! is always lowercase hex without a `0x` prefix.

/// Declare a fixed-length byte newtype.
///
/// The generated type gets `LEN`, `ZERO`, `from_bytes`, `from_slice`,
/// `as_bytes`, `is_zero`, `to_hex`, `from_hex`, `FromStr`, and hex-string
/// `Serialize`/`Deserialize` impls. Derives are supplied by the caller so
/// secret-bearing types can opt out of `Copy`.
#[macro_export]
macro_rules! fixed_bytes {
    ($(#[$meta:meta])* pub struct $name:ident($len:expr);) => {
        $(#[$meta])*
        pub struct $name([u8; $len]);

        impl $name {
            /// Length in bytes.
            pub const LEN: usize = $len;

            /// All-zero value (sentinel).
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wrap raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Copy from a slice, checking the length.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, $crate::CryptoError> {
                let arr: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| $crate::CryptoError::InvalidLength {
                            kind: stringify!($name),
                            expected: $len,
                            actual: bytes.len(),
                        })?;
                Ok(Self(arr))
            }

            /// Parse from hex (no prefix).
            pub fn from_hex(s: &str) -> Result<Self, $crate::CryptoError> {
                let bytes =
                    ::hex::decode(s).map_err(|e| $crate::CryptoError::InvalidHex(e.to_string()))?;
                Self::from_slice(&bytes)
            }

            /// Raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// True for the all-zero sentinel.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Lowercase hex, no prefix.
            pub fn to_hex(&self) -> String {
                ::hex::encode(self.0)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::CryptoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(::serde::de::Error::custom)
            }
        }
    };
}
