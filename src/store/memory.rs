use std::collections::{BTreeMap, HashMap};

use bitcoin::{absolute::Height, BlockHash};

use crate::error::Result;

use super::SilentBlockStore;

/// Keeps every encoded block in memory.
///
/// Saving a height twice replaces the previous block, which is what happens
/// when a reorganized height is indexed again.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blocks: BTreeMap<u32, (BlockHash, Vec<u8>)>,
    heights: HashMap<BlockHash, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl SilentBlockStore for MemoryStore {
    fn save(&mut self, height: Height, hash: BlockHash, encoded: Vec<u8>) -> Result<()> {
        let height = height.to_consensus_u32();

        if let Some((replaced, _)) = self.blocks.insert(height, (hash, encoded)) {
            if replaced != hash {
                self.heights.remove(&replaced);
            }
        }
        self.heights.insert(hash, height);

        Ok(())
    }

    fn get_by_height(&self, height: Height) -> Result<Option<Vec<u8>>> {
        Ok(self
            .blocks
            .get(&height.to_consensus_u32())
            .map(|(_, encoded)| encoded.clone()))
    }

    fn get_by_hash(&self, hash: &BlockHash) -> Result<Option<Vec<u8>>> {
        Ok(self
            .heights
            .get(hash)
            .and_then(|height| self.blocks.get(height))
            .map(|(_, encoded)| encoded.clone()))
    }

    fn last_indexed(&self) -> Option<Height> {
        self.blocks
            .keys()
            .next_back()
            .and_then(|height| Height::from_consensus(*height).ok())
    }
}
