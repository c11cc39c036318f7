//! # Stack VM
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Opcodes | `opcodes.rs` | Opcode table and name lookup |
//! | Values | `value.rs` | Typed stack values |
//! | Parser | `parser.rs` | Program text → items |
//! | Stack | `stack.rs` | Bounded, absolutely indexed stack |
//! | Interpreter | `interpreter.rs` | Fetch loop and opcode semantics |

mod interpreter;
mod opcodes;
mod parser;
mod stack;
mod value;

pub use interpreter::{ExecutionResult, Params, Vm};
pub use opcodes::Opcode;
pub use parser::{parse_program, parse_values, Item};
pub use stack::Stack;
pub use value::Value;
