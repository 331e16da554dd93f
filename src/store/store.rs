use std::str::FromStr;

use bitcoin::{absolute::Height, BlockHash};

use crate::error::{Error, Result};

pub trait SilentBlockStore {
    fn save(&mut self, height: Height, hash: BlockHash, encoded: Vec<u8>) -> Result<()>;

    fn get_by_height(&self, height: Height) -> Result<Option<Vec<u8>>>;

    fn get_by_hash(&self, hash: &BlockHash) -> Result<Option<Vec<u8>>>;

    /// Lookup by the usual hex representation of a block hash.
    fn get_by_hash_hex(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        let hash =
            BlockHash::from_str(hash).map_err(|_| Error::InvalidBlockHash(hash.to_owned()))?;
        self.get_by_hash(&hash)
    }

    /// Highest height saved so far.
    fn last_indexed(&self) -> Option<Height>;
}
