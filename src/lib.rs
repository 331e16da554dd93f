pub mod constants;
pub mod encoding;
mod error;
mod indexer;
pub mod outputs;
mod structs;
pub mod tweak;

mod backend;
mod config;
mod store;
mod updater;

pub use bitcoin;
pub use silentpayments;

pub use error::{Error, Result};
pub use structs::*;

pub use backend::{BlockData, ChainBackend};
#[cfg(feature = "bitcoind-backend")]
pub use backend::{BitcoindBackend, BitcoindClient};
pub use config::{BitcoinCoreConfig, IndexerConfig};
pub use indexer::{BlockIndexer, IndexedBlock};
pub use store::{MemoryStore, SilentBlockStore};
pub use tweak::ScanTweakComputer;
pub use updater::{DummyUpdater, Updater};
