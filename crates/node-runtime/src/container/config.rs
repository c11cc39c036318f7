//! # Node Configuration
//!
//! Defaults, overridden by `MC_*` environment variables:
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `MC_MINER_ADDRESS` | `miner_address` | 64 hex chars |
//! | `MC_POW_THREADS` | `production.pow.threads` | 1-255 |
//! | `MC_DIFFICULTY` | `production.difficulty` | positive integer |
//! | `MC_BOOTSTRAP_BLOCKS` | `bootstrap_blocks` | integer |

use mc_03_block_production::{genesis_address, BlockProductionConfig};
use serde::Deserialize;
use shared_crypto::Hash;
use std::str::FromStr;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Receives the fees of every block this node mines (default: genesis).
    pub miner_address: Hash,
    /// Empty blocks sealed on top of genesis at startup.
    pub bootstrap_blocks: u64,
    /// Block production settings.
    pub production: BlockProductionConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            miner_address: genesis_address(),
            bootstrap_blocks: 10,
            production: BlockProductionConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An override could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Environment variable name
        key: &'static str,
        /// Raw value
        value: String,
    },
}

impl NodeConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply every override `lookup` knows about.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(miner) = parse(&lookup, "MC_MINER_ADDRESS")? {
            self.miner_address = miner;
        }
        if let Some(threads) = parse::<u8>(&lookup, "MC_POW_THREADS")? {
            if threads == 0 {
                return Err(invalid("MC_POW_THREADS", "0"));
            }
            self.production.pow.threads = threads;
        }
        if let Some(difficulty) = parse::<u64>(&lookup, "MC_DIFFICULTY")? {
            if difficulty == 0 {
                return Err(invalid("MC_DIFFICULTY", "0"));
            }
            self.production.difficulty = difficulty;
        }
        if let Some(blocks) = parse(&lookup, "MC_BOOTSTRAP_BLOCKS")? {
            self.bootstrap_blocks = blocks;
        }
        Ok(())
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|value| value.trim().parse().map_err(|_| invalid(key, &value)))
        .transpose()
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}
