pub mod memory_store;
pub mod overlay_store;

pub use memory_store::*;
pub use overlay_store::*;
