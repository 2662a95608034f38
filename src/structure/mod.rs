use crate::consts::{MARKER_DIRECTORY, MARKER_FILE};
use crate::util::error::FsError;

pub(crate) mod allocator;
pub(crate) mod block;
pub(crate) mod chain;
pub(crate) mod directory;

/// What a directory entry (and a block marker) says a thing is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

impl FileKind {
    pub fn as_byte(self) -> u8 {
        match self {
            FileKind::File => MARKER_FILE,
            FileKind::Directory => MARKER_DIRECTORY,
        }
    }

    pub fn from_byte(byte: u8) -> Result<FileKind, FsError> {
        match byte {
            MARKER_FILE => Ok(FileKind::File),
            MARKER_DIRECTORY => Ok(FileKind::Directory),
            _ => Err(FsError::Corrupt("unknown entry type byte")),
        }
    }
}
