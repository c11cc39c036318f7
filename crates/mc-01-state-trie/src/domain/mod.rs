pub mod errors;
pub mod nibbles;
pub mod node;
pub mod proofs;
pub mod state;
pub mod trie;

pub use errors::*;
pub use nibbles::*;
pub use node::*;
pub use proofs::*;
pub use state::*;
pub use trie::*;
