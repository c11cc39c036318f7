//! # mc-02-contract-vm
//!
//! Stack VM run for every transaction output whose target account has code.
//!
//! ## Role in System
//!
//! - **Input**: world state, the callee account, output params, the
//!   addresses that funded the call and the amount spent
//! - **Output**: a return value and the state after every write the script
//!   made, or a `VmError` that discards those writes
//!
//! ## Execution Model
//!
//! | Concept | Behaviour |
//! |---------|-----------|
//! | Program | Whitespace-delimited items, PC is the 1-based item index |
//! | Stack | Typed values, absolute indexing, bounded by `max_stack_size` |
//! | Frames | `fp` points at the saved caller fp; args sit below it |
//! | State | Copy-on-write `WorldState` snapshots |
//! | Nested calls | `OP_TRANSFER` into a contract runs a child VM |
//!
//! ## Safety Limits
//!
//! | Limit | Default |
//! |-------|---------|
//! | `max_steps` | 100 000 per outermost run, nested calls included |
//! | `max_call_depth` | 32 nested transfers |
//! | `max_stack_size` | 1024 values |
//! | `max_value_size` | 1024 values inside one entry, list elements counted |
//!
//! ## Usage
//!
//! ```ignore
//! let vm = Vm::new(state, Params::Script("120 16".into()), callee, &[], 0, VmConfig::default())?;
//! let result = vm.run()?;
//! assert_eq!(result.retval, Value::Int(8));
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod errors;
pub mod vm;

pub use config::VmConfig;
pub use errors::VmError;
pub use vm::{parse_program, parse_values, ExecutionResult, Item, Opcode, Params, Stack, Value, Vm};
