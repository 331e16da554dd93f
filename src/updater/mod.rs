//! Progress reporting for long indexing runs.
//!
//! The indexer calls an [`Updater`] after every block it has stored, so
//! callers can persist their own checkpoint or surface progress to a user.

mod dummy_updater;
mod updater;

pub use dummy_updater::DummyUpdater;
pub use updater::Updater;
