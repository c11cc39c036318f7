//! PoW nonce search
//!
//! ## Nonce Layout
//!
//! ```text
//! byte 0      thread id
//! bytes 1-23  zero
//! bytes 24-31 per-thread counter, big-endian
//! ```
//!
//! Each thread owns a disjoint slice of the nonce space, so no two threads
//! ever hash the same header.

use crate::config::PoWConfig;
use crate::domain::difficulty::meets_target;
use crate::domain::entities::{Block, BlockSkeleton};
use crate::error::{BlockError, Result};
use shared_crypto::Hash;
use shared_types::Record;
use std::sync::atomic::{AtomicBool, Ordering};

/// Parallel PoW nonce search on OS threads
#[derive(Clone, Debug)]
pub struct PoWMiner {
    num_threads: u8,
    max_attempts: u64,
}

impl PoWMiner {
    /// Create a miner with `threads` workers (at least one).
    pub fn new(threads: u8, max_attempts: u64) -> Self {
        Self {
            num_threads: threads.max(1),
            max_attempts,
        }
    }

    pub fn from_config(config: &PoWConfig) -> Self {
        Self::new(config.threads, config.max_attempts)
    }

    pub fn threads(&self) -> u8 {
        self.num_threads
    }

    /// Nonce tried by `thread` on its `counter`-th attempt.
    pub fn nonce_for(thread: u8, counter: u64) -> Hash {
        let mut bytes = [0u8; 32];
        bytes[0] = thread;
        bytes[24..].copy_from_slice(&counter.to_be_bytes());
        Hash::from_bytes(bytes)
    }

    /// Search for a nonce that puts the block hash within the target.
    ///
    /// Every thread checks a shared stop flag before each attempt and
    /// stops as soon as any thread finds a solution.
    #[tracing::instrument(skip_all, fields(height = skeleton.header().height, threads = self.num_threads))]
    pub fn seal(&self, skeleton: BlockSkeleton) -> Result<Block> {
        let difficulty = skeleton.header().difficulty;
        let per_thread = self.max_attempts.div_ceil(u64::from(self.num_threads));
        tracing::debug!(difficulty, per_thread, "starting PoW search");

        let found = AtomicBool::new(false);
        let nonce = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.num_threads)
                .map(|thread| {
                    let skeleton = &skeleton;
                    let found = &found;
                    scope.spawn(move || {
                        for counter in 0..per_thread {
                            if found.load(Ordering::Relaxed) {
                                return None;
                            }
                            let nonce = Self::nonce_for(thread, counter);
                            if meets_target(&skeleton.with_nonce(nonce).hash(), difficulty) {
                                found.store(true, Ordering::Relaxed);
                                return Some(nonce);
                            }
                        }
                        None
                    })
                })
                .collect();

            // A panicked worker simply contributes no nonce.
            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok().flatten())
                .next()
        });

        match nonce {
            Some(nonce) => {
                let block = Block::new(skeleton, nonce);
                tracing::info!(hash = %block.hash(), %nonce, "PoW mining successful");
                Ok(block)
            }
            None => {
                tracing::warn!("PoW mining failed: no valid nonce found");
                Err(BlockError::MiningFailed {
                    attempts: self.max_attempts,
                })
            }
        }
    }
}

impl Default for PoWMiner {
    fn default() -> Self {
        Self::from_config(&PoWConfig::default())
    }
}
