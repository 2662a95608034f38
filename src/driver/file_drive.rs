use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;

use crate::consts::{BlockId, BLOCK_SIZE};
use crate::driver::{BlockDevice, DeviceError};

/// Image-file backed block device. The image is created (or grown) to the
/// requested geometry on open, so a fresh file reads back as all zeroes.
pub struct FileDrive {
    file: File,
    blocks: usize,
}

impl FileDrive {
    pub fn new(path: &str, blocks: usize) -> std::io::Result<FileDrive> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        file.set_len((blocks * BLOCK_SIZE) as u64)?;

        Ok(FileDrive { file, blocks })
    }
}

impl BlockDevice for FileDrive {
    fn block_count(&self) -> usize {
        self.blocks
    }

    fn get_block(&self, index: BlockId) -> Result<Vec<u8>, DeviceError> {
        if index < 0 || index as usize >= self.blocks {
            return Err(DeviceError::OutOfBounds(index));
        }

        let mut buffer = vec![0u8; BLOCK_SIZE];
        self.file
            .read_exact_at(&mut buffer, index as u64 * BLOCK_SIZE as u64)
            .map_err(|_| DeviceError::Read(index))?;
        Ok(buffer)
    }

    fn put_block(&mut self, index: BlockId, block: &[u8]) -> Result<(), DeviceError> {
        if index < 0 || index as usize >= self.blocks {
            return Err(DeviceError::OutOfBounds(index));
        }

        if block.len() != BLOCK_SIZE {
            return Err(DeviceError::Write(index));
        }

        self.file
            .write_all_at(block, index as u64 * BLOCK_SIZE as u64)
            .map_err(|_| DeviceError::Write(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write() {
        let mut drive = FileDrive::new("./test-images/file_drive_read_write.img", 16).unwrap();

        let block = vec![0x42; BLOCK_SIZE];
        drive.put_block(3, &block).unwrap();
        assert_eq!(drive.get_block(3).unwrap(), block);
        assert_eq!(drive.get_block(4).unwrap(), vec![0; BLOCK_SIZE]);
    }

    #[test]
    fn out_of_bounds() {
        let mut drive = FileDrive::new("./test-images/file_drive_bounds.img", 8).unwrap();

        assert_eq!(drive.get_block(8), Err(DeviceError::OutOfBounds(8)));
        assert_eq!(drive.get_block(-1), Err(DeviceError::OutOfBounds(-1)));
        assert_eq!(
            drive.put_block(9, &vec![0; BLOCK_SIZE]),
            Err(DeviceError::OutOfBounds(9))
        );
    }
}
