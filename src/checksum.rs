//! IEEE CRC32 (reflected, initial `0xFFFFFFFF`, final XOR `0xFFFFFFFF`) over a
//! contiguous byte region, used to checksum the `Magic..Value` span of every
//! legacy message.

use crc::crc32;

/// Computes the IEEE CRC32 of `bytes`.
pub fn checksum_ieee(bytes: &[u8]) -> u32 {
    crc32::checksum_ieee(bytes)
}
