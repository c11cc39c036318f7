//! # Request Handlers
//!
//! JSON handlers exposing the chain to RPC callers.

pub mod rpc;

pub use rpc::{RpcError, RpcHandler};
