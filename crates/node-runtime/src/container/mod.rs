//! # Node Container
//!
//! Configuration and the shared chain the binary and the RPC handler work on.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig};
pub use subsystems::{now, NodeContainer};
