//! # VM Stack
//!
//! Typed value stack with absolute indexing (for the frame pointer and
//! `OP_PUSHABS`/`OP_POPABS`) and a configurable size limit.

use super::Value;
use crate::errors::VmError;
use shared_crypto::{Hash, Keypair, Pubkey, Signature};

/// Heterogeneous LIFO stack.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    data: Vec<Value>,
    max: usize,
    max_value_size: usize,
}

macro_rules! typed_pop {
    ($(#[$meta:meta])* $fn:ident, $variant:ident, $ty:ty, $name:literal) => {
        $(#[$meta])*
        pub fn $fn(&mut self, opcode: &'static str) -> Result<$ty, VmError> {
            match self.pop()? {
                Value::$variant(v) => Ok(v),
                other => Err(VmError::TypeMismatch {
                    opcode,
                    expected: $name,
                    actual: other.type_name(),
                }),
            }
        }
    };
}

impl Stack {
    /// Creates an empty stack holding at most `max` entries, none larger
    /// than `max_value_size` (see [`Value::size`]).
    #[must_use]
    pub fn new(max: usize, max_value_size: usize) -> Self {
        Self {
            data: Vec::with_capacity(64.min(max)),
            max,
            max_value_size,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Push a value onto the stack.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if the stack is full and `ValueTooLarge` if
    /// `value` exceeds the per-entry limit.
    pub fn push(&mut self, value: Value) -> Result<(), VmError> {
        if self.data.len() >= self.max {
            return Err(VmError::StackOverflow { max: self.max });
        }
        let size = value.size();
        if size > self.max_value_size {
            return Err(VmError::ValueTooLarge {
                size,
                max: self.max_value_size,
            });
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` if the stack is empty.
    pub fn pop(&mut self) -> Result<Value, VmError> {
        self.data.pop().ok_or(VmError::StackUnderflow)
    }

    pub fn peek(&self) -> Result<&Value, VmError> {
        self.data.last().ok_or(VmError::StackUnderflow)
    }

    typed_pop!(pop_int, Int, i64, "int");
    typed_pop!(pop_str, Str, String, "str");
    typed_pop!(pop_list, List, Vec<Value>, "list");
    typed_pop!(pop_hash, Hash, Hash, "hash");
    typed_pop!(pop_signature, Signature, Signature, "signature");
    typed_pop!(pop_pubkey, Pubkey, Pubkey, "pubkey");
    typed_pop!(pop_keypair, Keypair, Keypair, "keypair");

    /// Pop an int that must be a valid index or count.
    pub fn pop_index(&mut self, opcode: &'static str) -> Result<usize, VmError> {
        let value = self.pop_int(opcode)?;
        usize::try_from(value).map_err(|_| VmError::InvalidOperand { opcode, value })
    }

    fn slot(&self, index: i64) -> Result<usize, VmError> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.data.len())
            .ok_or(VmError::IndexOutOfRange {
                index,
                len: self.data.len(),
            })
    }

    /// Value at absolute position `index` (0 = bottom).
    pub fn get(&self, index: i64) -> Result<&Value, VmError> {
        Ok(&self.data[self.slot(index)?])
    }

    /// Overwrite the value at absolute position `index`.
    pub fn set(&mut self, index: i64, value: Value) -> Result<(), VmError> {
        let slot = self.slot(index)?;
        self.data[slot] = value;
        Ok(())
    }

    /// Swap the top element with the one `depth` positions below it.
    pub fn swap_down(&mut self, depth: usize) -> Result<(), VmError> {
        let len = self.data.len();
        if depth >= len {
            return Err(VmError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Pop `n` values, bottom-first.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, VmError> {
        if n > self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        Ok(self.data.split_off(self.data.len() - n))
    }

    /// Cut the stack down to `len` values.
    pub fn truncate(&mut self, len: usize) -> Result<(), VmError> {
        if len > self.data.len() {
            return Err(VmError::IndexOutOfRange {
                index: i64::try_from(len).unwrap_or(i64::MAX),
                len: self.data.len(),
            });
        }
        self.data.truncate(len);
        Ok(())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.data
    }
}
