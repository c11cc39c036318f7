//! # Error Types
//!
//! Every way a script can abort. Any `VmError` ends the VM without a return
//! value; the only place one is caught is `OP_TRANSFER`, which turns a
//! nested failure into a `0` on the caller's stack.

use crate::vm::Opcode;
use mc_01_state_trie::StateError;
use shared_crypto::Hash;
use shared_types::ValidationError;
use thiserror::Error;

// =============================================================================
// VM ERRORS
// =============================================================================

/// Errors that can occur while parsing or running a script.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Program text could not be parsed.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Output params may only contain literal values.
    #[error("opcode {0} not allowed in params")]
    OpcodeInParams(Opcode),

    /// Pop from an empty stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack grew past the configured limit.
    #[error("stack overflow: limit {max}")]
    StackOverflow { max: usize },

    /// A list would hold more values than the configured limit.
    #[error("value too large: {size} values, limit {max}")]
    ValueTooLarge { size: usize, max: usize },

    /// Operand has the wrong type.
    #[error("{opcode}: expected {expected}, got {actual}")]
    TypeMismatch {
        opcode: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// Absolute or frame-relative stack index outside the stack.
    #[error("stack index {index} out of range (size {len})")]
    IndexOutOfRange { index: i64, len: usize },

    /// Program counter left the program.
    #[error("pc {pc} outside program of {len} items")]
    PcOutOfRange { pc: i64, len: usize },

    /// Integer overflow, division by zero, or a similar arithmetic fault.
    #[error("{opcode}: arithmetic error")]
    Arithmetic { opcode: &'static str },

    /// Operand outside the values an opcode accepts.
    #[error("{opcode}: invalid operand {value}")]
    InvalidOperand { opcode: &'static str, value: i64 },

    /// Per-VM instruction budget exhausted.
    #[error("step limit exceeded: {max}")]
    StepLimitExceeded { max: u64 },

    /// Nested contract calls went too deep.
    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded { depth: usize, max: usize },

    /// Referenced account is not in the state.
    #[error("account not found: {0}")]
    AccountNotFound(Hash),

    /// Storage slot does not exist on the executing account.
    #[error("storage slot not found: {0}")]
    StorageNotFound(String),

    /// `OP_CREATECONTR` with storage name and value lists of different length.
    #[error("storage lists differ in length: {names} names, {values} values")]
    StorageArity { names: usize, values: usize },

    /// Record invariant violated (balance, storage typing, keys).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// State access error.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// `OP_KILL` was executed.
    #[error("script killed")]
    Killed,
}

impl VmError {
    pub(crate) fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
