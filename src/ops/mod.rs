use log::{debug, info};

use crate::consts::{
    BlockId, Fd, MARKER_DIRECTORY, MARKER_FILE, MARKER_FREE, MAX_OPEN_FILES, ROOT_BLOCK,
};
use crate::driver::BlockDevice;
use crate::io::Io;
use crate::structure::block::BlockBuf;
use crate::structure::chain::Chain;
use crate::structure::directory::Directory;
use crate::structure::FileKind;
use crate::util::error::FsError;

pub(crate) mod open_files;
pub(crate) mod path;

use open_files::OpenFileTable;

/// The file system facade: path-addressed structural operations plus
/// descriptor-addressed content operations over one injected block device.
/// Single-threaded; callers serialize access externally.
pub struct Sfs<D: BlockDevice> {
    io: Io<D>,
    open_files: OpenFileTable,
}

impl<D: BlockDevice> Sfs<D> {
    /// Mounts the device when block 0 already carries a directory control
    /// block, otherwise erases the device and creates a fresh root.
    pub fn new(device: D) -> Result<Sfs<D>, FsError> {
        let mut fs = Sfs {
            io: Io::new(device)?,
            open_files: OpenFileTable::new(MAX_OPEN_FILES),
        };

        if fs.io.get(ROOT_BLOCK)?[0] == MARKER_DIRECTORY {
            debug!("mounted existing image, {} blocks", fs.io.block_count());
        } else {
            fs.initialize(true)?;
        }

        Ok(fs)
    }

    /// Optionally frees every block, then (re)creates the root directory and
    /// forgets every open descriptor.
    pub fn initialize(&mut self, erase: bool) -> Result<(), FsError> {
        if erase {
            let free = BlockBuf::new_free();
            for id in 0..self.io.block_count() as BlockId {
                self.io.put(id, free.as_bytes())?;
            }
        }

        self.io
            .put(ROOT_BLOCK, BlockBuf::new_directory().as_bytes())?;
        self.open_files.reset();

        info!(
            "initialized file system, {} blocks, erase={}",
            self.io.block_count(),
            erase
        );
        Ok(())
    }

    /// Creates a file or directory at `pathname`. The parent must exist, be a
    /// directory, and not already contain the final component's name.
    pub fn create(&mut self, pathname: &str, kind: FileKind) -> Result<(), FsError> {
        let components = path::parse(pathname)?;

        let name = match components.last() {
            Some(name) => name,
            // The root exists from initialization onward.
            None => return Err(FsError::AlreadyExists("/".to_string())),
        };

        let parent = self.resolve_directory(path::dirname(&components))?;
        let start = parent.add_entry(&mut self.io, name, kind)?;

        let block = match kind {
            FileKind::Directory => BlockBuf::new_directory(),
            FileKind::File => BlockBuf::new_file(),
        };
        self.io.put(start, block.as_bytes())?;

        debug!("created {} `{}` at block {}", kind_name(kind), pathname, start);
        Ok(())
    }

    /// Deletes the file or directory at `pathname`. Directories must be
    /// empty; a file's whole chain is freed. Descriptors still referencing
    /// the freed block are invalidated.
    pub fn delete(&mut self, pathname: &str) -> Result<(), FsError> {
        let components = path::parse(pathname)?;

        let name = match components.last() {
            Some(name) => name,
            None => return Err(FsError::RootProtected),
        };

        let parent = self.resolve_directory(path::dirname(&components))?;
        let kind = parent.kind_of(&self.io, name)?;
        let start = parent.start_of(&self.io, name)?;

        match kind {
            FileKind::Directory => {
                let target = Directory { id: start };
                if !target.is_empty(&self.io)? {
                    return Err(FsError::DirectoryNotEmpty);
                }

                let mut block = BlockBuf::from_raw(self.io.get(start)?);
                block.set_marker(MARKER_FREE);
                self.io.put(start, block.as_bytes())?;
            }
            FileKind::File => {
                Chain { start }.free(&mut self.io)?;
            }
        }

        parent.remove_entry(&mut self.io, name)?;
        self.open_files.close_all(start);

        debug!("deleted {} `{}` from block {}", kind_name(kind), pathname, start);
        Ok(())
    }

    /// Resolves `pathname` and hands out a descriptor for it. Directories can
    /// be opened too; their descriptors only support `readdir`.
    pub fn open(&mut self, pathname: &str) -> Result<Fd, FsError> {
        let components = path::parse(pathname)?;
        let block = path::traverse(&self.io, &components)?;
        self.open_files.add(block)
    }

    pub fn close(&mut self, fd: Fd) -> Result<(), FsError> {
        self.open_files.close(fd)
    }

    /// Reads `length` bytes starting at byte `start` of the open file.
    pub fn read(&self, fd: Fd, start: usize, length: usize) -> Result<Vec<u8>, FsError> {
        let block = self.file_block(fd)?;
        Chain { start: block }.read(&self.io, start, length)
    }

    /// Writes `data` at byte `start` of the open file, growing it as needed.
    pub fn write(&mut self, fd: Fd, start: usize, data: &[u8]) -> Result<(), FsError> {
        let block = self.file_block(fd)?;
        Chain { start: block }.write(&mut self.io, start, data)
    }

    /// Names of the live entries of the open directory, in slot order.
    pub fn readdir(&self, fd: Fd) -> Result<Vec<String>, FsError> {
        let block = self.open_files.find(fd)?;

        if self.io.get(block)?[0] != MARKER_DIRECTORY {
            return Err(FsError::NotADirectory(format!("fd {fd}")));
        }

        Directory { id: block }.list(&self.io)
    }

    /// Byte size of the regular file at `pathname`. Size is not defined for
    /// directories through this call.
    pub fn getsize(&self, pathname: &str) -> Result<usize, FsError> {
        let (kind, start) = self.stat(pathname)?;

        if kind != FileKind::File {
            return Err(FsError::NotAFile);
        }

        Chain { start }.size(&self.io)
    }

    pub fn gettype(&self, pathname: &str) -> Result<FileKind, FsError> {
        Ok(self.stat(pathname)?.0)
    }

    fn stat(&self, pathname: &str) -> Result<(FileKind, BlockId), FsError> {
        let components = path::parse(pathname)?;

        let name = match components.last() {
            Some(name) => name,
            None => return Ok((FileKind::Directory, ROOT_BLOCK)),
        };

        let parent = self.resolve_directory(path::dirname(&components))?;
        Ok((
            parent.kind_of(&self.io, name)?,
            parent.start_of(&self.io, name)?,
        ))
    }

    /// Traverses to a directory and checks the marker; a file in the final
    /// position must not be read as an entry table.
    fn resolve_directory(&self, components: &[String]) -> Result<Directory, FsError> {
        let block = path::traverse(&self.io, components)?;

        if self.io.get(block)?[0] != MARKER_DIRECTORY {
            let name = components.last().cloned().unwrap_or_default();
            return Err(FsError::NotADirectory(name));
        }

        Ok(Directory { id: block })
    }

    fn file_block(&self, fd: Fd) -> Result<BlockId, FsError> {
        let block = self.open_files.find(fd)?;

        if self.io.get(block)?[0] != MARKER_FILE {
            return Err(FsError::NotAFile);
        }

        Ok(block)
    }
}

fn kind_name(kind: FileKind) -> &'static str {
    match kind {
        FileKind::File => "file",
        FileKind::Directory => "directory",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mem_drive::MemDrive;

    fn fresh() -> Sfs<MemDrive> {
        Sfs::new(MemDrive::default()).unwrap()
    }

    #[test]
    fn create_open_write_read() {
        let mut fs = fresh();

        fs.create("/docs", FileKind::Directory).unwrap();
        fs.create("/docs/note", FileKind::File).unwrap();

        let fd = fs.open("/docs/note").unwrap();
        let data: Vec<u8> = (1..=300u32).map(|i| (i % 250) as u8 + 1).collect();
        fs.write(fd, 0, &data).unwrap();

        assert_eq!(fs.read(fd, 0, 300).unwrap(), data);
        assert_eq!(fs.getsize("/docs/note").unwrap(), 300);
        fs.close(fd).unwrap();
    }

    #[test]
    fn gettype_distinguishes_kinds() {
        let mut fs = fresh();

        fs.create("/d", FileKind::Directory).unwrap();
        fs.create("/f", FileKind::File).unwrap();

        assert_eq!(fs.gettype("/").unwrap(), FileKind::Directory);
        assert_eq!(fs.gettype("/d").unwrap(), FileKind::Directory);
        assert_eq!(fs.gettype("/f").unwrap(), FileKind::File);
        assert_eq!(
            fs.gettype("/nope"),
            Err(FsError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn getsize_rejects_directories() {
        let mut fs = fresh();

        fs.create("/d", FileKind::Directory).unwrap();
        assert_eq!(fs.getsize("/d"), Err(FsError::NotAFile));
    }

    #[test]
    fn duplicate_create_fails() {
        let mut fs = fresh();

        fs.create("/twice", FileKind::File).unwrap();
        assert_eq!(
            fs.create("/twice", FileKind::File),
            Err(FsError::AlreadyExists("twice".to_string()))
        );
        assert_eq!(
            fs.create("/", FileKind::Directory),
            Err(FsError::AlreadyExists("/".to_string()))
        );
    }

    #[test]
    fn non_empty_directories_resist_deletion() {
        let mut fs = fresh();

        fs.create("/d", FileKind::Directory).unwrap();
        fs.create("/d/f", FileKind::File).unwrap();

        assert_eq!(fs.delete("/d"), Err(FsError::DirectoryNotEmpty));

        fs.delete("/d/f").unwrap();
        fs.delete("/d").unwrap();
        assert_eq!(fs.gettype("/d"), Err(FsError::NotFound("d".to_string())));
    }

    #[test]
    fn deleting_a_file_frees_its_blocks() {
        let mut fs = fresh();

        fs.create("/big", FileKind::File).unwrap();
        let fd = fs.open("/big").unwrap();
        fs.write(fd, 0, &vec![3u8; 300]).unwrap();
        fs.delete("/big").unwrap();

        // The same blocks carry the replacement file.
        fs.create("/next", FileKind::File).unwrap();
        let fd = fs.open("/next").unwrap();
        fs.write(fd, 0, &vec![4u8; 300]).unwrap();
        assert_eq!(fs.read(fd, 0, 300).unwrap(), vec![4u8; 300]);
    }

    #[test]
    fn deletion_invalidates_open_descriptors() {
        let mut fs = fresh();

        fs.create("/f", FileKind::File).unwrap();
        let fd = fs.open("/f").unwrap();
        fs.delete("/f").unwrap();

        assert_eq!(fs.read(fd, 0, 1), Err(FsError::BadDescriptor(fd)));
        assert_eq!(fs.close(fd), Err(FsError::BadDescriptor(fd)));
    }

    #[test]
    fn root_cannot_be_deleted() {
        let mut fs = fresh();
        assert_eq!(fs.delete("/"), Err(FsError::RootProtected));
    }

    #[test]
    fn readdir_lists_entries() {
        let mut fs = fresh();

        fs.create("/a", FileKind::File).unwrap();
        fs.create("/b", FileKind::Directory).unwrap();

        let fd = fs.open("/").unwrap();
        assert_eq!(fs.readdir(fd).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn content_calls_check_the_descriptor_kind() {
        let mut fs = fresh();

        fs.create("/d", FileKind::Directory).unwrap();
        fs.create("/f", FileKind::File).unwrap();

        let dir_fd = fs.open("/d").unwrap();
        let file_fd = fs.open("/f").unwrap();

        assert_eq!(fs.read(dir_fd, 0, 1), Err(FsError::NotAFile));
        assert_eq!(fs.write(dir_fd, 0, b"x"), Err(FsError::NotAFile));
        assert!(matches!(
            fs.readdir(file_fd),
            Err(FsError::NotADirectory(_))
        ));
    }

    #[test]
    fn files_cannot_be_path_interiors() {
        let mut fs = fresh();

        fs.create("/f", FileKind::File).unwrap();
        assert_eq!(
            fs.create("/f/child", FileKind::File),
            Err(FsError::NotADirectory("f".to_string()))
        );
    }

    #[test]
    fn initialize_erases_everything() {
        let mut fs = fresh();

        fs.create("/f", FileKind::File).unwrap();
        let fd = fs.open("/f").unwrap();

        fs.initialize(true).unwrap();

        assert_eq!(fs.gettype("/f"), Err(FsError::NotFound("f".to_string())));
        assert_eq!(fs.read(fd, 0, 1), Err(FsError::BadDescriptor(fd)));
        // Descriptor numbering starts over after a reset.
        fs.create("/g", FileKind::File).unwrap();
        assert_eq!(fs.open("/g").unwrap(), 0);
    }

    #[test]
    fn mount_keeps_existing_content() {
        let mut drive = MemDrive::default();

        {
            let mut fs = Sfs::new(&mut drive).unwrap();
            fs.create("/keep", FileKind::File).unwrap();
            let fd = fs.open("/keep").unwrap();
            fs.write(fd, 0, b"still here").unwrap();
        }

        let fs = Sfs::new(&mut drive).unwrap();
        assert_eq!(fs.getsize("/keep").unwrap(), 10);
        let fd_err = fs.read(99, 0, 1);
        assert_eq!(fd_err, Err(FsError::BadDescriptor(99)));
    }
}
