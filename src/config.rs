use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONCURRENT_BLOCK_REQUESTS;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct BitcoinCoreConfig {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub rpc_user: String,
    pub rpc_pass: String,
}

impl BitcoinCoreConfig {
    pub fn rpc_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.rpc_host, self.rpc_port)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct IndexerConfig {
    pub bitcoin_core: BitcoinCoreConfig,
    /// First height handed to the indexer when nothing has been indexed yet.
    #[serde(default)]
    pub start_height: u32,
    #[serde(default = "default_concurrent_block_requests")]
    pub concurrent_block_requests: usize,
}

fn default_protocol() -> String {
    "http".to_owned()
}

fn default_concurrent_block_requests() -> usize {
    DEFAULT_CONCURRENT_BLOCK_REQUESTS
}

impl IndexerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let config: IndexerConfig = serde_json::from_str(&contents)?;

        Ok(config)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
