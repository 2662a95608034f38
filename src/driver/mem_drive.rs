use crate::consts::{BlockId, BLOCK_SIZE, BLOCKS};
use crate::driver::{BlockDevice, DeviceError};

/// In-memory block device for tests. Starts zero-filled, like a fresh image.
pub struct MemDrive {
    blocks: Vec<Vec<u8>>,
}

impl MemDrive {
    pub fn new(blocks: usize) -> MemDrive {
        MemDrive {
            blocks: vec![vec![0u8; BLOCK_SIZE]; blocks],
        }
    }
}

impl Default for MemDrive {
    fn default() -> MemDrive {
        MemDrive::new(BLOCKS)
    }
}

impl BlockDevice for MemDrive {
    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn get_block(&self, index: BlockId) -> Result<Vec<u8>, DeviceError> {
        if index < 0 || index as usize >= self.blocks.len() {
            return Err(DeviceError::OutOfBounds(index));
        }

        Ok(self.blocks[index as usize].clone())
    }

    fn put_block(&mut self, index: BlockId, block: &[u8]) -> Result<(), DeviceError> {
        if index < 0 || index as usize >= self.blocks.len() {
            return Err(DeviceError::OutOfBounds(index));
        }

        if block.len() != BLOCK_SIZE {
            return Err(DeviceError::Write(index));
        }

        self.blocks[index as usize].copy_from_slice(block);
        Ok(())
    }
}
