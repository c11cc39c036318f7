//! # VM Configuration
//!
//! Execution safety limits. Scripts are untrusted, so every VM is bounded
//! in steps, stack and value size, and nesting depth.

use serde::{Deserialize, Serialize};

/// Execution limits for one VM and the contracts it calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Maximum instructions executed by a single VM (default: 100 000).
    pub max_steps: u64,
    /// Maximum nesting of `OP_TRANSFER` calls into contracts (default: 32).
    pub max_call_depth: usize,
    /// Maximum stack size (default: 1024).
    pub max_stack_size: usize,
    /// Maximum values in one stack entry, counting every nested list
    /// element and the list itself (default: 1024).
    pub max_value_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_call_depth: 32,
            max_stack_size: 1024,
            max_value_size: 1024,
        }
    }
}
