use bitcoin::{absolute::Height, BlockHash};

use crate::{error::Result, structs::SilentBlock};

pub trait Updater {
    fn record_progress(&mut self, start: Height, current: Height, end: Height) -> Result<()>;

    fn record_silent_block(
        &mut self,
        height: Height,
        hash: BlockHash,
        silent_block: &SilentBlock,
    ) -> Result<()>;

    fn update_last_indexed(&mut self, height: Height) -> Result<()>;
}
