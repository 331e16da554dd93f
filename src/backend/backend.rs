use std::{ops::RangeInclusive, pin::Pin};

use async_trait::async_trait;
use bitcoin::absolute::Height;
use futures::Stream;

use crate::error::Result;

use super::structs::BlockData;

/// Source of confirmed blocks whose inputs already carry their previous output scripts.
///
/// Implementations report chain access failures as
/// [`Error::UpstreamUnavailable`](crate::Error::UpstreamUnavailable).
#[async_trait]
pub trait ChainBackend: Sync {
    /// Block data for every height in `range`, yielded in height order.
    fn get_block_data_for_range(
        &self,
        range: RangeInclusive<u32>,
    ) -> Pin<Box<dyn Stream<Item = Result<BlockData>> + Send>>;

    async fn block_data(&self, block_height: Height) -> Result<BlockData>;

    async fn block_height(&self) -> Result<Height>;
}
