//! # Node Runtime Library
//!
//! Wires block production into a runnable node. The main entry point is the
//! `main.rs` binary; this library exposes its parts for testing.
//!
//! - `container/` - configuration and the shared chain plus local miner
//! - `handlers/` - JSON RPC handlers over the chain

#![warn(clippy::all)]

pub mod container;
pub mod handlers;

pub use container::{ConfigError, NodeConfig, NodeContainer};
pub use handlers::{RpcError, RpcHandler};
