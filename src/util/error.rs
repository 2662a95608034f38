use libc::c_int;
use thiserror::Error;

use crate::consts::{BlockId, Fd, MAX_NAME};
use crate::driver::DeviceError;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum FsError {
    // Path errors.
    #[error("pathname is empty")]
    EmptyPath,
    #[error("pathname is not absolute")]
    NotAbsolute,
    #[error("pathname contains consecutive separators")]
    DoubleSeparator,
    #[error("path component `{0}` is longer than {MAX_NAME} characters")]
    ComponentTooLong(String),
    #[error("pathname has too many components")]
    PathTooDeep,

    // Traversal errors.
    #[error("`{0}` not found")]
    NotFound(String),
    #[error("`{0}` is not a directory")]
    NotADirectory(String),

    // Allocation errors.
    #[error("no free block left")]
    Exhausted,
    #[error("directory has no free entry slot")]
    DirectoryFull,

    // State errors.
    #[error("`{0}` already exists")]
    AlreadyExists(String),
    #[error("directory is not empty")]
    DirectoryNotEmpty,
    #[error("the root directory cannot be deleted")]
    RootProtected,
    #[error("descriptor does not refer to a regular file")]
    NotAFile,
    #[error("bad file descriptor {0}")]
    BadDescriptor(Fd),
    #[error("open file table is full")]
    TableFull,

    // Content errors.
    #[error("range is past the end of the file chain")]
    OutOfRange,
    #[error("negative file offset")]
    NegativeOffset,
    #[error("declared length does not match the payload")]
    LengthMismatch,
    #[error("buffer is too small for the result")]
    BufferTooSmall,

    // On-disk integrity errors.
    #[error("block id {0} is outside the encodable domain")]
    IdOutOfDomain(BlockId),
    #[error("corrupt block content: {0}")]
    Corrupt(&'static str),

    #[error(transparent)]
    Io(#[from] DeviceError),
}

impl FsError {
    /// The errno equivalent used by the numeric call contract. Callers negate
    /// it, so every value here is positive.
    pub fn errno(&self) -> c_int {
        match self {
            FsError::EmptyPath | FsError::NotAbsolute | FsError::DoubleSeparator => libc::EINVAL,
            FsError::ComponentTooLong(_) | FsError::PathTooDeep => libc::ENAMETOOLONG,
            FsError::NotFound(_) => libc::ENOENT,
            FsError::NotADirectory(_) => libc::ENOTDIR,
            FsError::Exhausted | FsError::DirectoryFull => libc::ENOSPC,
            FsError::AlreadyExists(_) => libc::EEXIST,
            FsError::DirectoryNotEmpty => libc::ENOTEMPTY,
            FsError::RootProtected => libc::EBUSY,
            FsError::NotAFile => libc::EISDIR,
            FsError::BadDescriptor(_) => libc::EBADF,
            FsError::TableFull => libc::EMFILE,
            FsError::OutOfRange | FsError::BufferTooSmall | FsError::IdOutOfDomain(_) => {
                libc::ERANGE
            }
            FsError::NegativeOffset | FsError::LengthMismatch => libc::EINVAL,
            FsError::Corrupt(_) | FsError::Io(_) => libc::EIO,
        }
    }
}
