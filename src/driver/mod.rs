use crate::consts::BlockId;

pub(crate) mod file_drive;
#[cfg(test)]
pub(crate) mod mem_drive;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to read block {0}")]
    Read(BlockId),
    #[error("failed to write block {0}")]
    Write(BlockId),
    #[error("block {0} is outside the device")]
    OutOfBounds(BlockId),
    #[error("device geometry of {0} blocks is unsupported")]
    Geometry(usize),
}

/// The raw block store. One call moves exactly one block-sized buffer and is
/// durable once `put_block` returns.
pub trait BlockDevice {
    fn block_count(&self) -> usize;
    fn get_block(&self, index: BlockId) -> Result<Vec<u8>, DeviceError>;
    fn put_block(&mut self, index: BlockId, block: &[u8]) -> Result<(), DeviceError>;
}

impl<D: BlockDevice + ?Sized> BlockDevice for &mut D {
    fn block_count(&self) -> usize {
        (**self).block_count()
    }

    fn get_block(&self, index: BlockId) -> Result<Vec<u8>, DeviceError> {
        (**self).get_block(index)
    }

    fn put_block(&mut self, index: BlockId, block: &[u8]) -> Result<(), DeviceError> {
        (**self).put_block(index, block)
    }
}
