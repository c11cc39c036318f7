//! # Integration Tests
//!
//! Block production, state transition and the contract VM working together.

pub mod fixtures;

mod records;
mod scenarios;
mod sync;
