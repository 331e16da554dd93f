use bitcoin::{absolute::Height, BlockHash};

use crate::structs::TransactionData;

/// A confirmed block with every transaction mapped to typed descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockData {
    pub height: Height,
    pub hash: BlockHash,
    pub transactions: Vec<TransactionData>,
}
