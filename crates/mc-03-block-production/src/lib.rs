//! # mc-03-block-production
//!
//! Block assembly, state transition, PoW sealing and fork choice.
//!
//! ## Data Flow
//!
//! ```text
//! transactions ──► BlockSkeleton::build ──► PoWMiner::seal ──► Blockchain::insert
//!                   │ sort by hash                 │ nonce search     │ heads, fork choice
//!                   │ check signatures             ▼                  ▼
//!                   │ transit() each          Block { nonce }    canonical head
//!                   ▼
//!              state root, tx root
//! ```
//!
//! ## Block Rules
//!
//! | Rule | Value |
//! |------|-------|
//! | Transaction order | ascending transaction hash |
//! | Difficulty | fixed, 1000 by default |
//! | PoW target | `⌊2²⁵⁶ / difficulty⌋`, hash read big-endian |
//! | Height | 1 at genesis, parent + 1 after |
//! | Fork choice | max accumulated difficulty, then min hash |
//!
//! A received block is accepted only if rebuilding it from its parent
//! reproduces its header exactly and its hash meets the target.

#![warn(clippy::all)]

/// Domain models and business logic
pub mod domain;

mod config;
mod error;

pub use config::{BlockProductionConfig, PoWConfig};
pub use error::{BlockError, Result, TransitionError};

// Re-export commonly used types
pub use domain::{
    genesis_account, genesis_address, genesis_pubkey, genesis_state, meets_target, target,
    transit, Block, BlockHeader, BlockSkeleton, Blockchain, PoWMiner, SkeletonHeader,
    GENESIS_CODE, GENESIS_PUBKEY_HEX,
};

/// Default per-block difficulty
pub const DEFAULT_DIFFICULTY: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_DIFFICULTY, 1000);
        assert_eq!(BlockProductionConfig::default().difficulty, DEFAULT_DIFFICULTY);
    }
}
