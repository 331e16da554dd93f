use std::{ops::RangeInclusive, pin::Pin, sync::Arc};

use async_trait::async_trait;
use bitcoin::absolute::Height;
use futures::{stream, Stream, StreamExt};
use log::debug;

use crate::{
    backend::{bitcoind::BitcoindClient, BlockData, ChainBackend},
    config::IndexerConfig,
    error::{Error, Result},
    structs::TransactionData,
};

#[derive(Debug)]
pub struct BitcoindBackend {
    client: BitcoindClient,
    concurrent_block_requests: usize,
}

impl BitcoindBackend {
    pub fn new(client: BitcoindClient, concurrent_block_requests: usize) -> Self {
        Self {
            client,
            concurrent_block_requests: concurrent_block_requests.max(1),
        }
    }

    pub fn from_config(config: &IndexerConfig) -> Result<Self> {
        let core = &config.bitcoin_core;
        let client = BitcoindClient::new(
            core.rpc_url(),
            core.rpc_user.clone(),
            core.rpc_pass.clone(),
        )
        .map_err(Error::upstream)?;

        Ok(Self::new(client, config.concurrent_block_requests))
    }
}

async fn fetch_block(client: &BitcoindClient, block_height: Height) -> Result<BlockData> {
    let hash = client
        .block_hash(block_height)
        .await
        .map_err(Error::upstream)?;
    let block = client.block(&hash).await.map_err(Error::upstream)?;

    if block.height != block_height.to_consensus_u32() || block.hash != hash {
        return Err(Error::upstream(anyhow::anyhow!(
            "node returned block {} at {} when asked for {} at {}",
            block.hash,
            block.height,
            hash,
            block_height
        )));
    }

    debug!("fetched block {} with {} transactions", hash, block.tx.len());

    let transactions = block
        .tx
        .into_iter()
        .map(TransactionData::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok(BlockData {
        height: block_height,
        hash,
        transactions,
    })
}

#[async_trait]
impl ChainBackend for BitcoindBackend {
    /// Blocks are requested concurrently but yielded in height order.
    fn get_block_data_for_range(
        &self,
        range: RangeInclusive<u32>,
    ) -> Pin<Box<dyn Stream<Item = Result<BlockData>> + Send>> {
        let client = Arc::new(self.client.clone());

        let res = stream::iter(range)
            .map(move |n| {
                let client = client.clone();

                async move {
                    let block_height = Height::from_consensus(n)?;
                    fetch_block(&client, block_height).await
                }
            })
            .buffered(self.concurrent_block_requests);

        Box::pin(res)
    }

    async fn block_data(&self, block_height: Height) -> Result<BlockData> {
        fetch_block(&self.client, block_height).await
    }

    async fn block_height(&self) -> Result<Height> {
        self.client.block_count().await.map_err(Error::upstream)
    }
}
