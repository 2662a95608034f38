/// Block id as stored on disk. Negative values are reserved for sentinels.
pub type BlockId = i32;
/// Descriptor handed out by the open file table.
pub type Fd = i32;

pub const BLOCK_SIZE: usize = 128;

/// The two-byte id encoding carries `[CHAIN_END, BLOCKS)`, so the block count
/// equals the codec capacity rather than a round power of two.
pub const BLOCKS: usize = 511;

pub const ROOT_BLOCK: BlockId = 0;
pub const CHAIN_END: BlockId = -1;

// Block type markers, byte 0 of every block.
pub const MARKER_FREE: u8 = 0xff;
pub const MARKER_FILE: u8 = 0x00;
pub const MARKER_DIRECTORY: u8 = 0x01;

// File block layout: marker, encoded next pointer, payload.
pub const NEXT_OFFSET: usize = 1;
pub const DATA_OFFSET: usize = 3;
pub const DATA_SIZE: usize = BLOCK_SIZE - DATA_OFFSET;

// Directory block layout: marker, then fixed-width entry slots.
pub const ENTRY_START: usize = 1;
pub const ENTRY_LENGTH: usize = 9;
pub const ENTRY_SLOTS: usize = (BLOCK_SIZE - ENTRY_START) / ENTRY_LENGTH;
pub const ENTRY_END: u8 = 0xff;

// Entry layout within a slot.
pub const ENTRY_TYPE: usize = 0;
pub const ENTRY_NAME: usize = 1;
pub const ENTRY_START_ID: usize = 7;

pub const MAX_NAME: usize = 6;
pub const MAX_PATH: usize = 512;
pub const MAX_OPEN_FILES: usize = 512;
