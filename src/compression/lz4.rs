//! Kafka's LZ4 codec, only valid for magic=1 batches.
//!
//! This produces and expects a standard-conformant LZ4 frame. The broker's
//! historical bug around the frame content-checksum flag for old clients is
//! deliberately **not** emulated here — see the Open Questions note in
//! `SPEC_FULL.md` §9. Round-tripping against this same implementation is the
//! only compatibility this crate promises for LZ4.

use std::io::{Read, Write};

use lz4_flex::frame::{FrameDecoder, FrameEncoder};

use crate::errors::{ErrorKind, Result};

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = FrameEncoder::new(Vec::new());
    encoder.write_all(data)?;
    encoder
        .finish()
        .map_err(|err| ErrorKind::CorruptRecord(format!("lz4 frame encode failed: {}", err)).into())
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = FrameDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|err| ErrorKind::CorruptRecord(format!("lz4 frame decode failed: {}", err)))?;
    Ok(out)
}
