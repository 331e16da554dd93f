mod client;
mod structs;

pub use client::BitcoindClient;
