use bitcoin::{absolute::Height, BlockHash};

use crate::{error::Result, structs::SilentBlock};

use super::Updater;

#[derive(Default)]
pub struct DummyUpdater;

impl DummyUpdater {
    pub fn new() -> Self {
        Self
    }
}

impl Updater for DummyUpdater {
    fn record_progress(&mut self, _start: Height, _current: Height, _end: Height) -> Result<()> {
        Ok(())
    }

    fn record_silent_block(
        &mut self,
        _height: Height,
        _hash: BlockHash,
        _silent_block: &SilentBlock,
    ) -> Result<()> {
        Ok(())
    }

    fn update_last_indexed(&mut self, _height: Height) -> Result<()> {
        Ok(())
    }
}
