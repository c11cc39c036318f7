//! Domain layer - block assembly, state transition and fork choice
//!
//! All code here is synchronous. Sealing uses OS threads; everything else
//! is a pure function of immutable state snapshots.
//!
//! ## Entities
//!
//! - [`SkeletonHeader`] / [`BlockHeader`]: the hashed, serialised forms
//! - [`BlockSkeleton`]: transactions applied, not yet sealed
//! - [`Block`]: a skeleton with its nonce
//!
//! ## Services
//!
//! - [`transit`]: apply one transaction to a state
//! - [`PoWMiner`]: parallel nonce search
//! - [`Blockchain`]: known blocks, heads and import

pub mod chain;
pub mod difficulty;
mod entities;
pub mod genesis;
pub mod transition;
mod services;

pub use chain::Blockchain;
pub use difficulty::{meets_target, target};
pub use entities::*;
pub use genesis::*;
pub use services::PoWMiner;
pub use transition::transit;
