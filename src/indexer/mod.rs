//! Turns confirmed blocks into silent blocks.
//!
//! A transaction makes it into a silent block when it has at least one
//! eligible output and its inputs yield a scan tweak. Transactions keep the
//! order they have in the source block.

mod indexer;

pub use indexer::{BlockIndexer, IndexedBlock};
