//! Slot hashing
//!
//! Keys map to one of 16384 slots: CRC16 (XMODEM) of the key modulo the slot
//! count. If the key contains a non-empty `{...}` section, only the first such
//! section is hashed, so related keys can be pinned to one slot.

/// Number of hash slots in a cluster
pub const SLOT_COUNT: u16 = 16384;

/// Highest valid slot number
pub const MAX_SLOT_ID: u16 = SLOT_COUNT - 1;

/// CRC16/XMODEM checksum of `bytes`
pub fn crc16(bytes: &[u8]) -> u16 {
    ::crc16::State::<::crc16::XMODEM>::calculate(bytes)
}

/// The `{hashtag}` section of a key, if it has a non-empty one
fn hashtag(key: &[u8]) -> Option<&[u8]> {
    let open = key.iter().position(|&b| b == b'{')?;
    let close = key[open + 1..].iter().position(|&b| b == b'}')?;
    let tag = &key[open + 1..open + 1 + close];
    (!tag.is_empty()).then_some(tag)
}

/// Slot that `key` belongs to
pub fn slot_for_key(key: &[u8]) -> u16 {
    let hashed = hashtag(key).unwrap_or(key);
    crc16(hashed) % SLOT_COUNT
}
