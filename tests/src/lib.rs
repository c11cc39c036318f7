//! # Marm-Chain Test Suite
//!
//! Cross-crate tests that drive the node the way a user would.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks (trie, VM, sealing)
//! └── src/integration/
//!     ├── fixtures.rs   # keys, accounts, block helpers
//!     ├── scenarios.rs  # end-to-end chain scenarios
//!     ├── records.rs    # JSON round-trips and signature tampering
//!     └── sync.rs       # two nodes exchanging blocks over the RPC handlers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mc-tests
//! cargo test -p mc-tests integration::scenarios::
//! cargo bench -p mc-tests
//! ```

pub mod integration;
