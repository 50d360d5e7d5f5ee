//! Thin, bounds-checked byte-buffer primitives shared by the builder and the
//! reader.
//!
//! The read half (`Cursor`) and the write half (`Writer`) are kept as
//! separate types rather than one type that juggles borrowed and owned
//! storage: the reader only ever needs read access to a buffer it does not
//! own, while the builder only ever needs to grow and patch a buffer it does
//! own. Splitting them avoids a `Cow`-flavored cursor that could silently
//! clone a borrowed buffer the moment a write method was called on it.

use byteorder::{BigEndian, ByteOrder};

use crate::errors::{ErrorKind, Result};

/// A read-only, bounds-checked view over a borrowed byte slice.
///
/// Every read validates that the requested span lies within the underlying
/// buffer; a short read fails with `ErrorKind::CorruptRecord` rather than
/// panicking.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn require(&self, at: usize, len: usize) -> Result<()> {
        let end = at
            .checked_add(len)
            .ok_or_else(|| ErrorKind::CorruptRecord("offset overflow".into()))?;
        if end > self.buf.len() {
            bail!(ErrorKind::CorruptRecord(format!(
                "buffer underflow: need {} bytes at offset {}, have {}",
                len,
                at,
                self.buf.len()
            )));
        }
        Ok(())
    }

    /// Returns a slice of `len` bytes starting at `at`, without moving the
    /// cursor's own read position.
    pub fn slice_at(&self, at: usize, len: usize) -> Result<&'a [u8]> {
        self.require(at, len)?;
        Ok(&self.buf[at..at + len])
    }

    /// Reads `len` bytes from the current position and advances past them.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let s = self.slice_at(self.pos, len)?;
        self.pos += len;
        Ok(s)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        let s = self.read_slice(1)?;
        Ok(s[0] as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let s = self.read_slice(2)?;
        Ok(BigEndian::read_i16(s))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let s = self.read_slice(4)?;
        Ok(BigEndian::read_i32(s))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let s = self.read_slice(8)?;
        Ok(BigEndian::read_i64(s))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let s = self.read_slice(4)?;
        Ok(BigEndian::read_u32(s))
    }
}

/// An owning, appendable byte buffer with big-endian write primitives and
/// post-hoc patching, used by the builder to lay down a message and then fix
/// up its size and CRC fields once both are known.
#[derive(Clone, Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Writer {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn write_i32(&mut self, v: i32) {
        let mut tmp = [0u8; 4];
        BigEndian::write_i32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn write_i64(&mut self, v: i64) {
        let mut tmp = [0u8; 8];
        BigEndian::write_i64(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn write_u32(&mut self, v: u32) {
        let mut tmp = [0u8; 4];
        BigEndian::write_u32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a `bytes`-coded field: a signed 32-bit length followed by that
    /// many bytes, or a length of -1 and nothing else for `None`.
    pub fn write_bytes_field(&mut self, bytes: Option<&[u8]>) {
        match bytes {
            Some(b) => {
                self.write_i32(b.len() as i32);
                self.write_bytes(b);
            }
            None => self.write_i32(-1),
        }
    }

    /// Overwrites 4 bytes at `at` with the big-endian encoding of `v`.
    /// `at` must have been a valid position produced earlier by this same
    /// writer.
    pub fn patch_i32(&mut self, at: usize, v: i32) {
        BigEndian::write_i32(&mut self.buf[at..at + 4], v);
    }

    pub fn patch_u32(&mut self, at: usize, v: u32) {
        BigEndian::write_u32(&mut self.buf[at..at + 4], v);
    }

    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
