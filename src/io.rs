use crate::consts::{BlockId, BLOCK_SIZE, BLOCKS};
use crate::driver::{BlockDevice, DeviceError};

/// Bounds-checked whole-block access over an injected device. Every higher
/// layer goes through this instead of touching the driver directly.
pub(crate) struct Io<D: BlockDevice> {
    device: D,
}

impl<D: BlockDevice> Io<D> {
    /// Wraps a device whose geometry the id encoding can address: at least
    /// one block, at most `BLOCKS`.
    pub fn new(device: D) -> Result<Io<D>, DeviceError> {
        let count = device.block_count();
        if count == 0 || count > BLOCKS {
            return Err(DeviceError::Geometry(count));
        }

        Ok(Io { device })
    }

    pub fn block_count(&self) -> usize {
        self.device.block_count()
    }

    pub fn get(&self, index: BlockId) -> Result<Vec<u8>, DeviceError> {
        if index < 0 || index as usize >= self.device.block_count() {
            return Err(DeviceError::OutOfBounds(index));
        }

        let block = self.device.get_block(index)?;
        if block.len() != BLOCK_SIZE {
            return Err(DeviceError::Read(index));
        }

        Ok(block)
    }

    pub fn put(&mut self, index: BlockId, block: &[u8]) -> Result<(), DeviceError> {
        if index < 0 || index as usize >= self.device.block_count() {
            return Err(DeviceError::OutOfBounds(index));
        }

        if block.len() != BLOCK_SIZE {
            return Err(DeviceError::Write(index));
        }

        self.device.put_block(index, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mem_drive::MemDrive;

    #[test]
    fn read_write() {
        let mut io = Io::new(MemDrive::new(16)).unwrap();

        let block = vec![0x42; BLOCK_SIZE];
        io.put(3, &block).unwrap();
        assert_eq!(io.get(3).unwrap(), block);
    }

    #[test]
    fn rejects_bad_sizes_and_indices() {
        let mut io = Io::new(MemDrive::new(4)).unwrap();

        assert_eq!(io.put(0, &[0u8; 12]), Err(DeviceError::Write(0)));
        assert_eq!(io.get(4), Err(DeviceError::OutOfBounds(4)));
        assert_eq!(io.get(-1), Err(DeviceError::OutOfBounds(-1)));
    }

    #[test]
    fn rejects_unsupported_geometries() {
        assert_eq!(
            Io::new(MemDrive::new(0)).err(),
            Some(DeviceError::Geometry(0))
        );
        assert_eq!(
            Io::new(MemDrive::new(BLOCKS + 1)).err(),
            Some(DeviceError::Geometry(BLOCKS + 1))
        );
    }
}
