use crate::consts::{
    BlockId, ENTRY_END, ENTRY_NAME, ENTRY_SLOTS, ENTRY_START_ID, ENTRY_TYPE, MAX_NAME, ROOT_BLOCK,
};
use crate::driver::BlockDevice;
use crate::io::Io;
use crate::structure::allocator::find_free_block;
use crate::structure::block::BlockBuf;
use crate::structure::FileKind;
use crate::util::codec::{decode_id, encode_id};
use crate::util::error::FsError;

const ROOT_NAME: &str = "/";

/// Handle to one directory control block. All operations load the block,
/// interpret its fixed-width entry table, and persist it in a single put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Directory {
    pub id: BlockId,
}

struct Entry {
    kind: FileKind,
    name: String,
    start: BlockId,
}

impl Directory {
    pub fn root() -> Directory {
        Directory { id: ROOT_BLOCK }
    }

    /// Allocates a start block for `name` and records `(kind, name, start)`
    /// in the first free slot. Duplicate names are rejected here, nowhere
    /// else. The new block itself is not written; the caller decides whether
    /// it becomes a file or a directory block.
    pub fn add_entry<D: BlockDevice>(
        &self,
        io: &mut Io<D>,
        name: &str,
        kind: FileKind,
    ) -> Result<BlockId, FsError> {
        if self.find_slot(io, name)?.is_some() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }

        let mut fcb = BlockBuf::from_raw(io.get(self.id)?);
        let slot = first_free_slot(&fcb).ok_or(FsError::DirectoryFull)?;
        let start = find_free_block(io)?;

        write_entry(fcb.slot_mut(slot), name, kind, start)?;

        // Advance the table sentinel into the next slot if it has never
        // carried one.
        if slot + 1 < ENTRY_SLOTS {
            let next = fcb.slot_mut(slot + 1);
            if next[ENTRY_TYPE] == 0 && next[ENTRY_NAME] == 0 {
                next[ENTRY_TYPE] = ENTRY_END;
            }
        }

        io.put(self.id, fcb.as_bytes())?;
        Ok(start)
    }

    /// Clears the slot holding `name` and returns the start block it pointed
    /// at. The freed slot keeps the sentinel byte so it can be reused.
    pub fn remove_entry<D: BlockDevice>(
        &self,
        io: &mut Io<D>,
        name: &str,
    ) -> Result<BlockId, FsError> {
        let mut fcb = BlockBuf::from_raw(io.get(self.id)?);

        let slot = match find_slot_in(&fcb, name)? {
            Some(slot) => slot,
            None => return Err(FsError::NotFound(name.to_string())),
        };

        let start = parse_entry(fcb.slot(slot))?.start;

        let bytes = fcb.slot_mut(slot);
        bytes.fill(0);
        bytes[ENTRY_TYPE] = ENTRY_END;

        io.put(self.id, fcb.as_bytes())?;
        Ok(start)
    }

    /// The kind recorded for `name`. The root directory has no parent entry,
    /// so its own name resolves without a table lookup.
    pub fn kind_of<D: BlockDevice>(&self, io: &Io<D>, name: &str) -> Result<FileKind, FsError> {
        if self.id == ROOT_BLOCK && name == ROOT_NAME {
            return Ok(FileKind::Directory);
        }

        match self.find_slot(io, name)? {
            Some((_, entry)) => Ok(entry.kind),
            None => Err(FsError::NotFound(name.to_string())),
        }
    }

    /// The start block recorded for `name`, with the same root special case.
    pub fn start_of<D: BlockDevice>(&self, io: &Io<D>, name: &str) -> Result<BlockId, FsError> {
        if self.id == ROOT_BLOCK && name == ROOT_NAME {
            return Ok(ROOT_BLOCK);
        }

        match self.find_slot(io, name)? {
            Some((_, entry)) => Ok(entry.start),
            None => Err(FsError::NotFound(name.to_string())),
        }
    }

    /// Live entry names in slot order.
    pub fn list<D: BlockDevice>(&self, io: &Io<D>) -> Result<Vec<String>, FsError> {
        let fcb = BlockBuf::from_raw(io.get(self.id)?);
        let mut names = Vec::new();

        for slot in 0..ENTRY_SLOTS {
            if slot_is_live(fcb.slot(slot)) {
                names.push(parse_entry(fcb.slot(slot))?.name);
            }
        }

        Ok(names)
    }

    pub fn is_empty<D: BlockDevice>(&self, io: &Io<D>) -> Result<bool, FsError> {
        let fcb = BlockBuf::from_raw(io.get(self.id)?);
        Ok((0..ENTRY_SLOTS).all(|slot| !slot_is_live(fcb.slot(slot))))
    }

    fn find_slot<D: BlockDevice>(
        &self,
        io: &Io<D>,
        name: &str,
    ) -> Result<Option<(usize, Entry)>, FsError> {
        let fcb = BlockBuf::from_raw(io.get(self.id)?);
        match find_slot_in(&fcb, name)? {
            Some(slot) => Ok(Some((slot, parse_entry(fcb.slot(slot))?))),
            None => Ok(None),
        }
    }
}

/// A slot holds an entry when it is neither sentinel-marked nor untouched.
/// Untouched slots sit past the sentinel and are all zero; a zeroed type byte
/// alone is ambiguous because it doubles as the file type.
fn slot_is_live(slot: &[u8]) -> bool {
    slot[ENTRY_TYPE] != ENTRY_END && slot[ENTRY_NAME] != 0
}

fn first_free_slot(fcb: &BlockBuf) -> Option<usize> {
    (0..ENTRY_SLOTS).find(|&slot| !slot_is_live(fcb.slot(slot)))
}

fn find_slot_in(fcb: &BlockBuf, name: &str) -> Result<Option<usize>, FsError> {
    for slot in 0..ENTRY_SLOTS {
        let bytes = fcb.slot(slot);
        if slot_is_live(bytes) && entry_name(bytes) == name.as_bytes() {
            return Ok(Some(slot));
        }
    }

    Ok(None)
}

fn entry_name(slot: &[u8]) -> &[u8] {
    let name = &slot[ENTRY_NAME..ENTRY_NAME + MAX_NAME];
    let end = name.iter().position(|&b| b == 0).unwrap_or(MAX_NAME);
    &name[..end]
}

fn parse_entry(slot: &[u8]) -> Result<Entry, FsError> {
    let kind = FileKind::from_byte(slot[ENTRY_TYPE])?;
    let name = String::from_utf8(entry_name(slot).to_vec())
        .map_err(|_| FsError::Corrupt("entry name is not valid utf-8"))?;
    let start = decode_id([slot[ENTRY_START_ID], slot[ENTRY_START_ID + 1]])?;

    Ok(Entry { kind, name, start })
}

fn write_entry(slot: &mut [u8], name: &str, kind: FileKind, start: BlockId) -> Result<(), FsError> {
    debug_assert!(!name.is_empty() && name.len() <= MAX_NAME);

    slot.fill(0);
    slot[ENTRY_TYPE] = kind.as_byte();
    slot[ENTRY_NAME..ENTRY_NAME + name.len()].copy_from_slice(name.as_bytes());

    let encoded = encode_id(start)?;
    slot[ENTRY_START_ID] = encoded[0];
    slot[ENTRY_START_ID + 1] = encoded[1];
    Ok(())
}
