//! Kafka's xerial-framed snappy variant.
//!
//! Framing: an 8-byte magic `\x82SNAPPY\x00`, two big-endian 32-bit version
//! fields (we always write the default `(1, 1)`), then a stream of
//! `(length: i32, block: snappy bytes)` records. Decompression also accepts
//! a bare (unframed) snappy payload, since some producers skip the xerial
//! wrapper entirely.

use byteorder::{BigEndian, ByteOrder};

use crate::errors::{ErrorKind, Result};

const XERIAL_MAGIC: &[u8] = b"\x82SNAPPY\x00";
const XERIAL_VERSION: i32 = 1;
const XERIAL_COMPAT_VERSION: i32 = 1;

/// Kafka chunks the xerial stream into blocks of at most this many bytes so
/// that no single snappy block has to hold an entire message set.
const BLOCK_SIZE: usize = 32 * 1024;

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() + XERIAL_MAGIC.len() + 8);
    out.extend_from_slice(XERIAL_MAGIC);

    let mut version = [0u8; 4];
    BigEndian::write_i32(&mut version, XERIAL_VERSION);
    out.extend_from_slice(&version);
    BigEndian::write_i32(&mut version, XERIAL_COMPAT_VERSION);
    out.extend_from_slice(&version);

    for chunk in data.chunks(BLOCK_SIZE) {
        let block = snap::raw::Encoder::new()
            .compress_vec(chunk)
            .map_err(|err| ErrorKind::CorruptRecord(format!("snappy compression failed: {}", err)))?;

        let mut len = [0u8; 4];
        BigEndian::write_i32(&mut len, block.len() as i32);
        out.extend_from_slice(&len);
        out.extend_from_slice(&block);
    }

    Ok(out)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.starts_with(XERIAL_MAGIC) {
        decompress_xerial(&data[XERIAL_MAGIC.len()..])
    } else {
        snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(|err| ErrorKind::CorruptRecord(format!("snappy decompression failed: {}", err)).into())
    }
}

fn decompress_xerial(mut rest: &[u8]) -> Result<Vec<u8>> {
    if rest.len() < 8 {
        bail!(ErrorKind::CorruptRecord(
            "truncated xerial snappy header".to_owned()
        ));
    }
    // Skip the two version fields; we don't reject on a version mismatch,
    // matching the tolerant stance real Kafka clients take here.
    rest = &rest[8..];

    let mut out = Vec::new();
    let mut decoder = snap::raw::Decoder::new();

    while !rest.is_empty() {
        if rest.len() < 4 {
            bail!(ErrorKind::CorruptRecord(
                "truncated xerial snappy block length".to_owned()
            ));
        }
        let len = BigEndian::read_i32(rest) as i64;
        rest = &rest[4..];
        if len < 0 || len as usize > rest.len() {
            bail!(ErrorKind::CorruptRecord(
                "xerial snappy block length out of range".to_owned()
            ));
        }
        let len = len as usize;
        let block = &rest[..len];
        rest = &rest[len..];

        let decoded = decoder
            .decompress_vec(block)
            .map_err(|err| ErrorKind::CorruptRecord(format!("snappy decompression failed: {}", err)))?;
        out.extend_from_slice(&decoded);
    }

    Ok(out)
}
