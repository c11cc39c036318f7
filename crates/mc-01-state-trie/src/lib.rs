//! # mc-01-state-trie
//!
//! Persistent Merkle trie and the world state built on it.
//!
//! ## Role in System
//!
//! - **State trie**: `address → hash(account)`, root committed in every block
//! - **Transaction trie**: `tx.hash → tx.hash`, membership provable per block
//! - **Pruning**: cherry-picked subtries and merges for partial views
//!
//! ## Trie Shape
//!
//! ```text
//! depth 0   [root: 16 children]          hash = H(c0 ‖ … ‖ c15)
//!              │ nibble 0 of path
//! depth 1   [branch]
//!              ⋮
//! depth 64  [leaf: value]                hash = value
//! ```
//!
//! Empty subtries hash to the zero sentinel and are never materialised as
//! branches.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
