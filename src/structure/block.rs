use crate::consts::{
    BlockId, BLOCK_SIZE, CHAIN_END, DATA_OFFSET, ENTRY_END, ENTRY_LENGTH, ENTRY_SLOTS,
    ENTRY_START, MARKER_DIRECTORY, MARKER_FILE, MARKER_FREE, NEXT_OFFSET,
};
use crate::util::codec::{decode_id, encode_id};
use crate::util::error::FsError;

/// Typed view over one raw block buffer. All offset arithmetic for the
/// on-disk layout lives here; the rest of the crate speaks in markers, next
/// pointers, payloads, and entry slots.
pub(crate) struct BlockBuf {
    data: Vec<u8>,
}

impl BlockBuf {
    pub fn from_raw(data: Vec<u8>) -> BlockBuf {
        debug_assert_eq!(data.len(), BLOCK_SIZE);
        BlockBuf { data }
    }

    /// A block carrying only the free marker.
    pub fn new_free() -> BlockBuf {
        let mut data = vec![0u8; BLOCK_SIZE];
        data[0] = MARKER_FREE;
        BlockBuf { data }
    }

    /// A directory control block with an empty entry table: the sentinel sits
    /// in the first slot's type-byte position.
    pub fn new_directory() -> BlockBuf {
        let mut data = vec![0u8; BLOCK_SIZE];
        data[0] = MARKER_DIRECTORY;
        data[ENTRY_START] = ENTRY_END;
        BlockBuf { data }
    }

    /// An empty file block terminating its chain.
    pub fn new_file() -> BlockBuf {
        let mut buf = BlockBuf {
            data: vec![0u8; BLOCK_SIZE],
        };
        buf.data[0] = MARKER_FILE;
        buf.set_next(CHAIN_END).expect("sentinel is encodable");
        buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn marker(&self) -> u8 {
        self.data[0]
    }

    pub fn set_marker(&mut self, marker: u8) {
        self.data[0] = marker;
    }

    pub fn next(&self) -> Result<BlockId, FsError> {
        decode_id([self.data[NEXT_OFFSET], self.data[NEXT_OFFSET + 1]])
    }

    pub fn set_next(&mut self, next: BlockId) -> Result<(), FsError> {
        let encoded = encode_id(next)?;
        self.data[NEXT_OFFSET] = encoded[0];
        self.data[NEXT_OFFSET + 1] = encoded[1];
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[DATA_OFFSET..]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.data[DATA_OFFSET..]
    }

    pub fn slot(&self, index: usize) -> &[u8] {
        debug_assert!(index < ENTRY_SLOTS);
        let offset = ENTRY_START + index * ENTRY_LENGTH;
        &self.data[offset..offset + ENTRY_LENGTH]
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        debug_assert!(index < ENTRY_SLOTS);
        let offset = ENTRY_START + index * ENTRY_LENGTH;
        &mut self.data[offset..offset + ENTRY_LENGTH]
    }
}
