use libc::c_int;
use log::warn;

use crate::driver::BlockDevice;
use crate::ops::Sfs;
use crate::structure::FileKind;
use crate::util::error::FsError;

const OK: c_int = 1;

/// Numeric front end over the facade, keeping the historical call contract:
/// `open` returns a descriptor or a negative errno, everything else returns 1
/// or a negative errno, and buffers belong to the caller.
pub struct SfsApi<D: BlockDevice> {
    fs: Sfs<D>,
}

impl<D: BlockDevice> SfsApi<D> {
    pub fn new(fs: Sfs<D>) -> SfsApi<D> {
        SfsApi { fs }
    }

    pub fn open(&mut self, pathname: &str) -> c_int {
        match self.fs.open(pathname) {
            Ok(fd) => fd,
            Err(error) => fail("open", pathname, error),
        }
    }

    pub fn close(&mut self, fd: c_int) -> c_int {
        match self.fs.close(fd) {
            Ok(()) => OK,
            Err(error) => fail("close", &fd.to_string(), error),
        }
    }

    /// Reads `length` bytes starting at `start` into `mem`. The buffer must
    /// hold at least `length` bytes.
    pub fn read(&self, fd: c_int, start: c_int, length: c_int, mem: &mut [u8]) -> c_int {
        let result = self.checked_range(start, length, mem.len()).and_then(|(start, length)| {
            let data = self.fs.read(fd, start, length)?;
            mem[..length].copy_from_slice(&data);
            Ok(())
        });

        match result {
            Ok(()) => OK,
            Err(error) => fail("read", &fd.to_string(), error),
        }
    }

    /// Writes `length` bytes from `mem` at position `start`. The declared
    /// length must match the payload exactly.
    pub fn write(&mut self, fd: c_int, start: c_int, length: c_int, mem: &[u8]) -> c_int {
        let result = (|| {
            if start < 0 {
                return Err(FsError::NegativeOffset);
            }
            if length < 0 || length as usize != mem.len() {
                return Err(FsError::LengthMismatch);
            }

            self.fs.write(fd, start as usize, mem)
        })();

        match result {
            Ok(()) => OK,
            Err(error) => fail("write", &fd.to_string(), error),
        }
    }

    /// Writes the directory listing into `mem`: entry names separated by a
    /// single space, NUL-terminated.
    pub fn readdir(&self, fd: c_int, mem: &mut [u8]) -> c_int {
        let result = (|| {
            let listing = self.fs.readdir(fd)?.join(" ");

            if listing.len() + 1 > mem.len() {
                return Err(FsError::BufferTooSmall);
            }

            mem[..listing.len()].copy_from_slice(listing.as_bytes());
            mem[listing.len()] = 0;
            Ok(())
        })();

        match result {
            Ok(()) => OK,
            Err(error) => fail("readdir", &fd.to_string(), error),
        }
    }

    /// Creates a file (`kind == 0`) or directory (`kind == 1`).
    pub fn create(&mut self, pathname: &str, kind: c_int) -> c_int {
        let kind = match kind {
            0 => FileKind::File,
            1 => FileKind::Directory,
            _ => return -libc::EINVAL,
        };

        match self.fs.create(pathname, kind) {
            Ok(()) => OK,
            Err(error) => fail("create", pathname, error),
        }
    }

    pub fn delete(&mut self, pathname: &str) -> c_int {
        match self.fs.delete(pathname) {
            Ok(()) => OK,
            Err(error) => fail("delete", pathname, error),
        }
    }

    pub fn getsize(&self, pathname: &str) -> c_int {
        match self.fs.getsize(pathname) {
            Ok(size) => size as c_int,
            Err(error) => fail("getsize", pathname, error),
        }
    }

    /// Returns 0 for a regular file, 1 for a directory.
    pub fn gettype(&self, pathname: &str) -> c_int {
        match self.fs.gettype(pathname) {
            Ok(FileKind::File) => 0,
            Ok(FileKind::Directory) => 1,
            Err(error) => fail("gettype", pathname, error),
        }
    }

    pub fn initialize(&mut self, erase: c_int) -> c_int {
        match self.fs.initialize(erase != 0) {
            Ok(()) => OK,
            Err(error) => fail("initialize", "", error),
        }
    }

    fn checked_range(
        &self,
        start: c_int,
        length: c_int,
        available: usize,
    ) -> Result<(usize, usize), FsError> {
        if start < 0 {
            return Err(FsError::NegativeOffset);
        }
        if length < 0 {
            return Err(FsError::LengthMismatch);
        }
        if length as usize > available {
            return Err(FsError::BufferTooSmall);
        }

        Ok((start as usize, length as usize))
    }
}

fn fail(operation: &str, subject: &str, error: FsError) -> c_int {
    warn!("{operation} `{subject}` failed: {error}");
    -error.errno()
}
