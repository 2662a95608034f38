use log::debug;

use crate::consts::{BlockId, MARKER_FREE, ROOT_BLOCK};
use crate::driver::BlockDevice;
use crate::io::Io;
use crate::util::error::FsError;

/// First-fit scan for a block carrying the free marker. Block 0 is reserved
/// for the root directory, so the scan starts past it. There is no free list;
/// every allocation pays the scan, which is fine at this block count.
pub(crate) fn find_free_block<D: BlockDevice>(io: &Io<D>) -> Result<BlockId, FsError> {
    for id in (ROOT_BLOCK + 1)..io.block_count() as BlockId {
        let block = io.get(id)?;
        if block[0] == MARKER_FREE {
            return Ok(id);
        }
    }

    debug!("free-block scan exhausted all {} blocks", io.block_count());
    Err(FsError::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BLOCK_SIZE, MARKER_FILE};
    use crate::driver::mem_drive::MemDrive;
    use crate::structure::block::BlockBuf;

    fn erased_io(blocks: usize) -> Io<MemDrive> {
        let mut io = Io::new(MemDrive::new(blocks)).unwrap();
        for id in 0..blocks as BlockId {
            io.put(id, BlockBuf::new_free().as_bytes()).unwrap();
        }
        io
    }

    #[test]
    fn skips_the_root_block() {
        let io = erased_io(8);
        assert_eq!(find_free_block(&io).unwrap(), 1);
    }

    #[test]
    fn skips_used_blocks() {
        let mut io = erased_io(8);
        let mut used = vec![0u8; BLOCK_SIZE];
        used[0] = MARKER_FILE;
        io.put(1, &used).unwrap();
        io.put(2, &used).unwrap();

        assert_eq!(find_free_block(&io).unwrap(), 3);
    }

    #[test]
    fn exhausted_when_nothing_is_free() {
        let mut io = erased_io(4);
        let used = BlockBuf::new_file();
        for id in 1..4 {
            io.put(id, used.as_bytes()).unwrap();
        }

        assert_eq!(find_free_block(&io), Err(FsError::Exhausted));
    }

    #[test]
    fn zero_filled_blocks_are_not_free() {
        // A brand-new device reads as all zeroes, which is the file marker,
        // not the free marker. Allocation requires an erased image.
        let io = Io::new(MemDrive::new(4)).unwrap();
        assert_eq!(find_free_block(&io), Err(FsError::Exhausted));
    }
}
