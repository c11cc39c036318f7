//! Configuration types for block production

use mc_02_contract_vm::VmConfig;
use serde::Deserialize;

/// Runtime configuration for building, sealing and validating blocks
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlockProductionConfig {
    /// Per-block PoW difficulty (default: 1000)
    pub difficulty: u64,

    /// PoW specific settings
    pub pow: PoWConfig,

    /// Limits for every VM run during state transition
    pub vm: VmConfig,
}

impl Default for BlockProductionConfig {
    fn default() -> Self {
        Self {
            difficulty: crate::DEFAULT_DIFFICULTY,
            pow: PoWConfig::default(),
            vm: VmConfig::default(),
        }
    }
}

/// PoW configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoWConfig {
    /// Number of mining threads (default: num_cpus, at most 255)
    pub threads: u8,

    /// Nonces to try across all threads before giving up
    pub max_attempts: u64,
}

impl Default for PoWConfig {
    fn default() -> Self {
        Self {
            threads: u8::try_from(num_cpus::get()).unwrap_or(u8::MAX).max(1),
            max_attempts: 10_000_000,
        }
    }
}
