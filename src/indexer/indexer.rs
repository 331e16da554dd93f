use std::{ops::RangeInclusive, time::Instant};

use bitcoin::{absolute::Height, BlockHash};
use futures::{pin_mut, Stream, StreamExt};
use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    backend::{BlockData, ChainBackend},
    constants::SILENT_BLOCK_TYPE_FULL,
    error::{Error, Result},
    outputs::extract_eligible_outputs,
    store::SilentBlockStore,
    structs::{SilentBlock, SilentTransaction, TransactionData},
    tweak::{CurveArithmetic, ScanTweakComputer, Secp256k1Curve},
    updater::Updater,
};

/// A block once indexed, in both its typed and its encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBlock {
    pub height: Height,
    pub hash: BlockHash,
    pub silent_block: SilentBlock,
    pub encoded: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct BlockIndexer<C = Secp256k1Curve> {
    computer: ScanTweakComputer<C>,
}

impl BlockIndexer {
    pub fn new() -> Self {
        Self {
            computer: ScanTweakComputer::new(),
        }
    }
}

impl Default for BlockIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> BlockIndexer<C>
where
    C: CurveArithmetic + Send + Sync,
{
    pub fn with_computer(computer: ScanTweakComputer<C>) -> Self {
        Self { computer }
    }

    /// `Ok(None)` when the transaction has nothing a recipient could scan for.
    pub fn index_transaction(&self, tx: &TransactionData) -> Result<Option<SilentTransaction>> {
        let outputs = extract_eligible_outputs(&tx.outputs);
        if outputs.is_empty() {
            return Ok(None);
        }

        let scan_tweak = match self.computer.compute_scan_tweak(&tx.txid, &tx.inputs) {
            Ok(scan_tweak) => scan_tweak,
            Err(Error::NoKeyMaterial(txid)) => {
                debug!("{}: no input key material", txid);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(Some(SilentTransaction {
            txid: tx.txid,
            outputs,
            scan_tweak,
        }))
    }

    fn index_transaction_or_skip(&self, tx: &TransactionData) -> Option<SilentTransaction> {
        match self.index_transaction(tx) {
            Ok(silent_tx) => silent_tx,
            Err(e) => {
                warn!("{}: skipped: {}", tx.txid, e);
                None
            }
        }
    }

    pub fn index_block(&self, block: &BlockData) -> SilentBlock {
        #[cfg(feature = "parallel")]
        let transactions: Vec<SilentTransaction> = block
            .transactions
            .par_iter()
            .filter_map(|tx| self.index_transaction_or_skip(tx))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let transactions: Vec<SilentTransaction> = block
            .transactions
            .iter()
            .filter_map(|tx| self.index_transaction_or_skip(tx))
            .collect();

        SilentBlock::new(SILENT_BLOCK_TYPE_FULL, transactions)
    }

    fn to_indexed(&self, block: BlockData) -> IndexedBlock {
        let silent_block = self.index_block(&block);
        let encoded = silent_block.encode();

        info!(
            "indexed block {} ({}): {} of {} transactions",
            block.height,
            block.hash,
            silent_block.len(),
            block.transactions.len()
        );

        IndexedBlock {
            height: block.height,
            hash: block.hash,
            silent_block,
            encoded,
        }
    }

    /// Indexes every block in `range` as the backend delivers it.
    ///
    /// Items come out in height order and each one is yielded as soon as its
    /// block is done.
    pub fn index_range<'a, B>(
        &'a self,
        backend: &'a B,
        range: RangeInclusive<u32>,
    ) -> impl Stream<Item = Result<IndexedBlock>> + 'a
    where
        B: ChainBackend + ?Sized,
    {
        backend
            .get_block_data_for_range(range)
            .map(move |block| block.map(|block| self.to_indexed(block)))
    }

    /// Indexes `start..=end` into `store`, stopping at the first failure.
    pub async fn index_blocks<B, S, U>(
        &self,
        backend: &B,
        start: Height,
        end: Height,
        store: &mut S,
        updater: &mut U,
    ) -> Result<()>
    where
        B: ChainBackend + ?Sized,
        S: SilentBlockStore + ?Sized,
        U: Updater + ?Sized,
    {
        if start > end {
            return Err(Error::InvalidRange(
                start.to_consensus_u32(),
                end.to_consensus_u32(),
            ));
        }

        info!("start: {} end: {}", start, end);
        let start_time = Instant::now();

        let range = start.to_consensus_u32()..=end.to_consensus_u32();
        let indexed_blocks = self.index_range(backend, range);
        pin_mut!(indexed_blocks);

        while let Some(indexed) = indexed_blocks.next().await {
            let IndexedBlock {
                height,
                hash,
                silent_block,
                encoded,
            } = indexed?;

            store.save(height, hash, encoded)?;

            updater.record_silent_block(height, hash, &silent_block)?;
            updater.record_progress(start, height, end)?;
            updater.update_last_indexed(height)?;
        }

        info!(
            "indexing complete in {} seconds",
            start_time.elapsed().as_secs()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{hashes::Hash, hex::FromHex, Amount, OutPoint, ScriptBuf, Txid};

    use super::*;
    use crate::structs::{InputDescriptor, InputSpend, OutputDescriptor};

    // generator point
    const G: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn p2wpkh_input(txid_byte: u8) -> InputDescriptor {
        let key = Vec::<u8>::from_hex(G).unwrap();
        let mut prevout = vec![0x00, 0x14];
        prevout.extend(bitcoin::hashes::hash160::Hash::hash(&key).to_byte_array());

        InputDescriptor {
            outpoint: OutPoint {
                txid: Txid::from_byte_array([txid_byte; 32]),
                vout: 0,
            },
            prevout_script: ScriptBuf::from_bytes(prevout),
            spend: InputSpend::Witness {
                stack: vec![vec![0x30; 71], key],
                script_sig: ScriptBuf::new(),
            },
        }
    }

    fn taproot_output(key: u8, sats: u64) -> OutputDescriptor {
        let mut script = vec![0x51, 0x20];
        script.extend([key; 32]);
        OutputDescriptor {
            script_pubkey: ScriptBuf::from_bytes(script),
            value: Amount::from_sat(sats),
        }
    }

    fn p2wpkh_output() -> OutputDescriptor {
        let mut script = vec![0x00, 0x14];
        script.extend([7u8; 20]);
        OutputDescriptor {
            script_pubkey: ScriptBuf::from_bytes(script),
            value: Amount::from_sat(1_000),
        }
    }

    fn tx(seed: u8, inputs: Vec<InputDescriptor>, outputs: Vec<OutputDescriptor>) -> TransactionData {
        TransactionData {
            txid: Txid::from_byte_array([seed; 32]),
            inputs,
            outputs,
        }
    }

    fn block(transactions: Vec<TransactionData>) -> BlockData {
        BlockData {
            height: Height::from_consensus(840_000).unwrap(),
            hash: BlockHash::from_byte_array([0xab; 32]),
            transactions,
        }
    }

    #[test]
    fn transaction_without_eligible_output_is_skipped() {
        let indexer = BlockIndexer::new();
        let tx = tx(1, vec![p2wpkh_input(1)], vec![p2wpkh_output()]);

        assert_eq!(indexer.index_transaction(&tx).unwrap(), None);
    }

    #[test]
    fn transaction_without_key_material_is_skipped() {
        let indexer = BlockIndexer::new();
        let coinbase = tx(1, vec![], vec![taproot_output(3, 5_000)]);

        assert_eq!(indexer.index_transaction(&coinbase).unwrap(), None);
    }

    #[test]
    fn eligible_outputs_keep_their_position() {
        let indexer = BlockIndexer::new();
        let tx = tx(
            1,
            vec![p2wpkh_input(1)],
            vec![p2wpkh_output(), taproot_output(3, 5_000), taproot_output(4, 6_000)],
        );

        let silent_tx = indexer.index_transaction(&tx).unwrap().unwrap();

        assert_eq!(silent_tx.txid, tx.txid);
        assert_eq!(silent_tx.outputs.len(), 2);
        assert_eq!(silent_tx.outputs[0].vout, 1);
        assert_eq!(silent_tx.outputs[0].pubkey, [3; 32]);
        assert_eq!(silent_tx.outputs[1].vout, 2);
        assert_eq!(silent_tx.outputs[1].value, Amount::from_sat(6_000));
        assert!(silent_tx.scan_tweak.to_public_key().is_ok());
    }

    #[test]
    fn block_keeps_source_order() {
        let indexer = BlockIndexer::new();
        let block = block(vec![
            tx(0, vec![], vec![taproot_output(1, 50)]),
            tx(1, vec![p2wpkh_input(1)], vec![taproot_output(2, 100)]),
            tx(2, vec![p2wpkh_input(2)], vec![p2wpkh_output()]),
            tx(3, vec![p2wpkh_input(3)], vec![taproot_output(3, 100)]),
            tx(4, vec![p2wpkh_input(4)], vec![taproot_output(4, 100)]),
        ]);

        let silent_block = indexer.index_block(&block);

        assert_eq!(silent_block.block_type(), SILENT_BLOCK_TYPE_FULL);
        let txids: Vec<Txid> = silent_block.transactions().iter().map(|tx| tx.txid).collect();
        assert_eq!(
            txids,
            vec![
                Txid::from_byte_array([1; 32]),
                Txid::from_byte_array([3; 32]),
                Txid::from_byte_array([4; 32]),
            ]
        );
    }

    #[test]
    fn block_with_nothing_to_index_is_empty() {
        let indexer = BlockIndexer::new();
        let block = block(vec![tx(0, vec![], vec![taproot_output(1, 50)])]);

        let silent_block = indexer.index_block(&block);

        assert!(silent_block.is_empty());
        assert_eq!(silent_block.encode(), vec![SILENT_BLOCK_TYPE_FULL, 0x00]);
    }

    #[test]
    fn same_inputs_give_same_tweak() {
        let indexer = BlockIndexer::new();
        let a = tx(1, vec![p2wpkh_input(9)], vec![taproot_output(1, 1)]);
        let b = tx(2, vec![p2wpkh_input(9)], vec![taproot_output(2, 2)]);

        let a = indexer.index_transaction(&a).unwrap().unwrap();
        let b = indexer.index_transaction(&b).unwrap().unwrap();

        assert_eq!(a.scan_tweak, b.scan_tweak);
    }
}
