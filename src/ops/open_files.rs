use crate::consts::{BlockId, Fd};
use crate::util::error::FsError;

/// Bounded mapping from file descriptor to block id. Descriptors count up
/// and are never reused; only `reset` starts the numbering over.
pub(crate) struct OpenFileTable {
    entries: Vec<(Fd, BlockId)>,
    next_fd: Fd,
    capacity: usize,
}

impl OpenFileTable {
    pub fn new(capacity: usize) -> OpenFileTable {
        OpenFileTable {
            entries: Vec::new(),
            next_fd: 0,
            capacity,
        }
    }

    pub fn add(&mut self, block: BlockId) -> Result<Fd, FsError> {
        if self.entries.len() == self.capacity {
            return Err(FsError::TableFull);
        }

        let fd = self.next_fd;
        self.next_fd += 1;
        self.entries.push((fd, block));
        Ok(fd)
    }

    pub fn find(&self, fd: Fd) -> Result<BlockId, FsError> {
        self.entries
            .iter()
            .find(|(open_fd, _)| *open_fd == fd)
            .map(|(_, block)| *block)
            .ok_or(FsError::BadDescriptor(fd))
    }

    pub fn close(&mut self, fd: Fd) -> Result<(), FsError> {
        let index = self
            .entries
            .iter()
            .position(|(open_fd, _)| *open_fd == fd)
            .ok_or(FsError::BadDescriptor(fd))?;

        self.entries.remove(index);
        Ok(())
    }

    /// Drops every descriptor referencing `block`. Used when the underlying
    /// file or directory is deleted while still open.
    pub fn close_all(&mut self, block: BlockId) {
        self.entries.retain(|(_, open_block)| *open_block != block);
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.next_fd = 0;
    }
}
