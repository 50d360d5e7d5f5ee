//! Iterates the messages stored in a legacy message set buffer, transparently
//! expanding any compressed envelope into its inner records.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;

use crate::checksum;
use crate::compression::{standard_codecs, CodecRegistry, CompressionType};
use crate::cursor::Cursor;
use crate::errors::{ErrorKind, Result};
use crate::protocol::message::{Message, TimestampType};
use crate::protocol::{validate_magic, Offset, TIMESTAMP_TYPE_MASK};

/// A parsed legacy message set, ready to be iterated.
///
/// Holding the buffer and the codec registry here (rather than on the
/// iterator itself) lets `iter` be called more than once over the same
/// bytes.
pub struct LegacyBatchReader<'a> {
    buf: &'a [u8],
    codecs: Arc<dyn CodecRegistry>,
}

impl<'a> LegacyBatchReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_codecs(buf, standard_codecs())
    }

    pub fn with_codecs(buf: &'a [u8], codecs: Arc<dyn CodecRegistry>) -> Self {
        LegacyBatchReader { buf, codecs }
    }

    pub fn iter(&self) -> Messages<'a> {
        Messages {
            cursor: Cursor::new(self.buf),
            codecs: self.codecs.clone(),
            pending: VecDeque::new(),
        }
    }

    /// Whether this is a control batch. Legacy message sets have no such
    /// concept; always `false`.
    pub fn is_control_batch(&self) -> bool {
        false
    }

    /// Whether this batch is part of a transaction. Legacy message sets
    /// predate transactions; always `false`.
    pub fn is_transactional(&self) -> bool {
        false
    }

    /// The producer id that wrote this batch. Legacy message sets carry no
    /// such field; always `None`.
    pub fn producer_id(&self) -> Option<i64> {
        None
    }

    /// The offset one past this batch's outer `Offset` field — for an
    /// uncompressed single message this is `offset + 1`; for a compressed
    /// batch whose inner offsets run `0..n-1` and whose outer offset a
    /// broker has stamped with the last assigned offset, this is the count
    /// of inner messages.
    pub fn next_offset(&self) -> Result<Offset> {
        let mut cursor = Cursor::new(self.buf);
        let offset = cursor.read_i64()?;
        Ok(offset + 1)
    }

    /// Recomputes the CRC32 over the outer message's covered region
    /// (`Magic..Value`) and compares it to the stored CRC. Does not recurse
    /// into a compressed envelope's inner messages — those are checked
    /// individually during iteration.
    pub fn validate_crc(&self) -> Result<bool> {
        let mut cursor = Cursor::new(self.buf);
        let _offset = cursor.read_i64()?;
        let message_size = cursor.read_i32()?;
        if message_size < 0 {
            bail!(ErrorKind::CorruptRecord("negative MessageSize".to_owned()));
        }
        let frame_end = cursor.position() + message_size as usize;
        if frame_end > cursor.len() {
            bail!(ErrorKind::CorruptRecord(
                "MessageSize runs past the end of the buffer".to_owned()
            ));
        }
        let stored = cursor.read_u32()?;
        let crc_region_start = cursor.position();
        let region = cursor.slice_at(crc_region_start, frame_end - crc_region_start)?;
        Ok(checksum::checksum_ieee(region) == stored)
    }
}

impl<'a> IntoIterator for LegacyBatchReader<'a> {
    type Item = Result<Message>;
    type IntoIter = Messages<'a>;

    fn into_iter(self) -> Messages<'a> {
        self.iter()
    }
}

/// Yields one [`Message`] at a time, reading further top-level frames from
/// the underlying buffer only once every message queued from the current
/// frame has been returned.
pub struct Messages<'a> {
    cursor: Cursor<'a>,
    codecs: Arc<dyn CodecRegistry>,
    pending: VecDeque<Message>,
}

impl<'a> Iterator for Messages<'a> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Result<Message>> {
        if let Some(message) = self.pending.pop_front() {
            return Some(Ok(message));
        }

        if self.cursor.is_empty() {
            return None;
        }

        match self.advance() {
            Ok(()) => self.pending.pop_front().map(Ok),
            Err(err) => {
                // Leave the cursor exhausted so a caller that keeps polling
                // after an error gets `None`, not a repeat of the failure.
                self.cursor.set_position(self.cursor.len());
                Some(Err(err))
            }
        }
    }
}

impl<'a> Messages<'a> {
    /// Parses one top-level `[Offset MessageSize Message]` frame from the
    /// cursor and pushes the message(s) it yields onto `pending`: one
    /// message for a plain frame, or every inner message for a compressed
    /// one.
    fn advance(&mut self) -> Result<()> {
        let frame = parse_frame(&mut self.cursor)?;
        let compression = CompressionType::from_bits(frame.attributes)?;

        match compression {
            CompressionType::None => {
                self.pending.push_back(Message {
                    offset: frame.offset,
                    timestamp: frame.timestamp,
                    timestamp_type: frame.timestamp_type,
                    key: frame.key,
                    value: frame.value,
                    checksum: frame.checksum,
                });
                Ok(())
            }
            kind => {
                self.codecs.require_available(kind)?;
                let payload = frame.value.ok_or_else(|| {
                    ErrorKind::CorruptRecord("Value of compressed message is None".to_owned())
                })?;
                trace!("expanding {} byte {} envelope at offset {}", payload.len(), kind, frame.offset);
                let log_append_override = match frame.timestamp_type {
                    Some(TimestampType::LogAppendTime) => frame.timestamp,
                    _ => None,
                };

                let decompressed = self.codecs.decompress(kind, &payload)?;
                let mut inner = Cursor::new(&decompressed);
                while !inner.is_empty() {
                    let inner_frame = parse_frame(&mut inner)?;
                    let (timestamp, timestamp_type) = match log_append_override {
                        Some(outer_ts) => (Some(outer_ts), Some(TimestampType::LogAppendTime)),
                        None => (inner_frame.timestamp, inner_frame.timestamp_type),
                    };
                    self.pending.push_back(Message {
                        offset: inner_frame.offset,
                        timestamp,
                        timestamp_type,
                        key: inner_frame.key,
                        value: inner_frame.value,
                        checksum: inner_frame.checksum,
                    });
                }
                Ok(())
            }
        }
    }
}

struct Frame {
    offset: i64,
    attributes: i8,
    timestamp: Option<i64>,
    timestamp_type: Option<TimestampType>,
    key: Option<Bytes>,
    value: Option<Bytes>,
    checksum: u32,
}

fn parse_frame(cursor: &mut Cursor) -> Result<Frame> {
    let offset = cursor.read_i64()?;
    let message_size = cursor.read_i32()?;
    if message_size < 0 {
        bail!(ErrorKind::CorruptRecord(
            "negative MessageSize".to_owned()
        ));
    }
    let frame_end = cursor.position() + message_size as usize;
    if frame_end > cursor.len() {
        bail!(ErrorKind::CorruptRecord(
            "MessageSize runs past the end of the buffer".to_owned()
        ));
    }

    let checksum = cursor.read_u32()?;
    let crc_region_start = cursor.position();

    let magic = cursor.read_i8()?;
    validate_magic(magic)?;
    let attributes = cursor.read_i8()?;

    let (timestamp, timestamp_type) = if magic == 1 {
        let ts = cursor.read_i64()?;
        let tt = if attributes & TIMESTAMP_TYPE_MASK != 0 {
            TimestampType::LogAppendTime
        } else {
            TimestampType::CreateTime
        };
        (Some(ts), Some(tt))
    } else {
        (None, None)
    };

    let key = read_bytes_field(cursor)?;
    let value = read_bytes_field(cursor)?;

    // Trust the declared MessageSize for framing rather than the number of
    // bytes the Key/Value length prefixes happen to account for: a
    // corrupted Value length (see the reader tests) must surface as a
    // `CorruptRecord`, not desync the cursor for whatever frame follows.
    cursor.set_position(frame_end);

    let crc_region = cursor.slice_at(crc_region_start, frame_end - crc_region_start)?;
    let computed = checksum::checksum_ieee(crc_region);
    if computed != checksum {
        bail!(ErrorKind::CorruptRecord(format!(
            "crc mismatch: expected {}, computed {}",
            checksum, computed
        )));
    }

    Ok(Frame {
        offset,
        attributes,
        timestamp,
        timestamp_type,
        key,
        value,
        checksum,
    })
}

fn read_bytes_field(cursor: &mut Cursor) -> Result<Option<Bytes>> {
    let len = cursor.read_i32()?;
    if len < -1 {
        bail!(ErrorKind::CorruptRecord(format!(
            "impossible negative length {}",
            len
        )));
    }
    if len < 0 {
        return Ok(None);
    }
    let bytes = cursor.read_slice(len as usize)?;
    Ok(Some(Bytes::copy_from_slice(bytes)))
}
