//! Retrieval side of the indexer.
//!
//! Encoded silent blocks are stored exactly as produced by
//! [`SilentBlock::encode`](crate::SilentBlock::encode) and looked up either by
//! height or by block hash. A `None` result means the block was never indexed.

mod memory;
mod store;

pub use memory::MemoryStore;
pub use store::SilentBlockStore;
