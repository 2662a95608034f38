use crate::consts::{BlockId, CHAIN_END};
use crate::util::error::FsError;

/// Ids below the threshold go in tier 0, biased so the end-of-chain sentinel
/// lands on zero; ids from the threshold up go in tier 1. Both tiers cover
/// 256 values, so the full domain is `[-1, 510]`.
const TIER_SPLIT: BlockId = 255;

pub const MIN_ID: BlockId = CHAIN_END;
pub const MAX_ID: BlockId = TIER_SPLIT + u8::MAX as BlockId;

/// Encodes a block id into its fixed two-byte on-disk form.
pub fn encode_id(id: BlockId) -> Result<[u8; 2], FsError> {
    if !(MIN_ID..=MAX_ID).contains(&id) {
        return Err(FsError::IdOutOfDomain(id));
    }

    if id < TIER_SPLIT {
        Ok([(id + 1) as u8, 0])
    } else {
        Ok([(id - TIER_SPLIT) as u8, 1])
    }
}

/// Restores a block id from its two-byte on-disk form.
pub fn decode_id(bytes: [u8; 2]) -> Result<BlockId, FsError> {
    match bytes[1] {
        0 => Ok(bytes[0] as BlockId - 1),
        1 => Ok(bytes[0] as BlockId + TIER_SPLIT),
        _ => Err(FsError::Corrupt("unknown id tier byte")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BLOCKS;

    #[test]
    fn round_trip_full_domain() {
        for id in MIN_ID..=MAX_ID {
            assert_eq!(decode_id(encode_id(id).unwrap()).unwrap(), id);
        }
    }

    #[test]
    fn tier_boundary() {
        assert_eq!(encode_id(254).unwrap(), [255, 0]);
        assert_eq!(encode_id(255).unwrap(), [0, 1]);
        assert_eq!(decode_id([255, 0]).unwrap(), 254);
        assert_eq!(decode_id([0, 1]).unwrap(), 255);
    }

    #[test]
    fn sentinel_is_all_zero() {
        assert_eq!(encode_id(CHAIN_END).unwrap(), [0, 0]);
        assert_eq!(decode_id([0, 0]).unwrap(), CHAIN_END);
    }

    #[test]
    fn domain_covers_every_block() {
        assert_eq!(MAX_ID + 1, BLOCKS as BlockId);
    }

    #[test]
    fn out_of_domain() {
        assert_eq!(encode_id(-2), Err(FsError::IdOutOfDomain(-2)));
        assert_eq!(encode_id(MAX_ID + 1), Err(FsError::IdOutOfDomain(MAX_ID + 1)));
        assert_eq!(decode_id([0, 7]), Err(FsError::Corrupt("unknown id tier byte")));
    }
}
