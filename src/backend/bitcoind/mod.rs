mod backend;
mod client;

pub use backend::BitcoindBackend;
pub use client::BitcoindClient;
