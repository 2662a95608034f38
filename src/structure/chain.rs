use log::debug;

use crate::consts::{BlockId, CHAIN_END, DATA_SIZE, MARKER_FILE, MARKER_FREE};
use crate::driver::BlockDevice;
use crate::io::Io;
use crate::structure::allocator::find_free_block;
use crate::structure::block::BlockBuf;
use crate::util::error::FsError;

/// Handle to the linked block sequence holding one file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Chain {
    pub start: BlockId,
}

impl Chain {
    /// Writes `data` into the chain starting `offset` bytes in, following
    /// existing links and allocating only where the chain ends. The last
    /// block touched gets the end-of-chain sentinel, which truncates anything
    /// that used to follow it. No rollback on a mid-write failure.
    pub fn write<D: BlockDevice>(
        &self,
        io: &mut Io<D>,
        offset: usize,
        data: &[u8],
    ) -> Result<(), FsError> {
        let mut id = self.start;
        let mut block = BlockBuf::from_raw(io.get(id)?);
        let mut offset = offset;

        // Skip whole blocks until the write offset falls inside one,
        // extending the chain when it ends short of the offset.
        while offset > DATA_SIZE {
            let next = block.next()?;
            (id, block) = if next == CHAIN_END {
                let grown = find_free_block(io)?;
                debug!("extending chain {} with block {}", self.start, grown);
                block.set_next(grown)?;
                io.put(id, block.as_bytes())?;
                let fresh = BlockBuf::new_file();
                io.put(grown, fresh.as_bytes())?;
                (grown, fresh)
            } else {
                (next, BlockBuf::from_raw(io.get(next)?))
            };
            offset -= DATA_SIZE;
        }

        let mut written = 0;
        let mut pos = offset;

        loop {
            block.set_marker(MARKER_FILE);

            let payload = block.payload_mut();
            let take = (data.len() - written).min(DATA_SIZE - pos.min(DATA_SIZE));
            payload[pos..pos + take].copy_from_slice(&data[written..written + take]);
            written += take;
            pos += take;

            if written == data.len() {
                break;
            }

            // Cross into the next block, allocating one if the chain ends.
            let next = match block.next()? {
                CHAIN_END => {
                    let grown = find_free_block(io)?;
                    debug!("extending chain {} with block {}", self.start, grown);
                    block.set_next(grown)?;
                    io.put(id, block.as_bytes())?;
                    io.put(grown, BlockBuf::new_file().as_bytes())?;
                    grown
                }
                next => {
                    io.put(id, block.as_bytes())?;
                    next
                }
            };

            id = next;
            block = BlockBuf::from_raw(io.get(next)?);
            pos = 0;
        }

        block.set_next(CHAIN_END)?;
        io.put(id, block.as_bytes())?;
        Ok(())
    }

    /// Copies `length` bytes starting `offset` bytes into the chain. Fails
    /// with `OutOfRange` when the chain ends before the offset is reached or
    /// before `length` bytes have been collected.
    pub fn read<D: BlockDevice>(
        &self,
        io: &Io<D>,
        offset: usize,
        length: usize,
    ) -> Result<Vec<u8>, FsError> {
        let mut id = self.start;
        let mut block = BlockBuf::from_raw(io.get(id)?);
        let mut offset = offset;

        while offset > DATA_SIZE {
            let next = block.next()?;
            if next == CHAIN_END {
                return Err(FsError::OutOfRange);
            }
            id = next;
            block = BlockBuf::from_raw(io.get(id)?);
            offset -= DATA_SIZE;
        }

        let mut out = Vec::with_capacity(length);
        let mut pos = offset;

        while out.len() < length {
            let payload = block.payload();
            let take = (length - out.len()).min(DATA_SIZE - pos.min(DATA_SIZE));
            out.extend_from_slice(&payload[pos..pos + take]);

            if out.len() < length {
                let next = block.next()?;
                if next == CHAIN_END {
                    return Err(FsError::OutOfRange);
                }
                block = BlockBuf::from_raw(io.get(next)?);
                pos = 0;
            }
        }

        Ok(out)
    }

    /// Marks every block of the chain free, front to back. Each block is
    /// persisted before its pointer is followed.
    pub fn free<D: BlockDevice>(&self, io: &mut Io<D>) -> Result<(), FsError> {
        let mut id = self.start;

        loop {
            let mut block = BlockBuf::from_raw(io.get(id)?);
            block.set_marker(MARKER_FREE);
            io.put(id, block.as_bytes())?;

            match block.next()? {
                CHAIN_END => return Ok(()),
                next => id = next,
            }
        }
    }

    /// Byte length of the chain: full payload capacity for every block but
    /// the last, plus the last block's used bytes (up to its NUL terminator,
    /// or all of it when unterminated).
    pub fn size<D: BlockDevice>(&self, io: &Io<D>) -> Result<usize, FsError> {
        let mut size = 0;
        let mut id = self.start;

        loop {
            let block = BlockBuf::from_raw(io.get(id)?);
            match block.next()? {
                CHAIN_END => {
                    let payload = block.payload();
                    let used = payload.iter().position(|&b| b == 0).unwrap_or(DATA_SIZE);
                    return Ok(size + used);
                }
                next => {
                    size += DATA_SIZE;
                    id = next;
                }
            }
        }
    }
}
