//! Framing, CRC placement, attribute-byte semantics, timestamp policy, size
//! accounting and compressed-envelope construction/parsing for the legacy
//! (pre-v2) Kafka message set wire format.
//!
//! ```text
//! Message (v0) => Offset MessageSize Crc MagicByte Attributes Key Value
//!   Offset      => int64
//!   MessageSize => int32
//!   Crc         => uint32
//!   MagicByte   => int8
//!   Attributes  => int8
//!   Key         => bytes
//!   Value       => bytes
//!
//! Message (v1) => Offset MessageSize Crc MagicByte Attributes Timestamp Key Value
//!   Timestamp   => int64, inserted between Attributes and Key
//! ```

pub mod builder;
pub mod message;
pub mod reader;

pub use self::builder::{LegacyBatchBuilder, RecordMetadata};
pub use self::message::{Message, TimestampType};
pub use self::reader::{LegacyBatchReader, Messages};

use crate::errors::Result;

pub type Offset = i64;
pub type Timestamp = i64;

/// Bit 3 of the Attributes byte: `CreateTime` (0) vs `LogAppendTime` (1).
/// Meaningful only for magic=1.
pub const TIMESTAMP_TYPE_MASK: i8 = 0x08;

/// The constant per-record byte cost of a legacy message, not counting the
/// Offset/MessageSize framing or the variable-length key/value bytes.
///
/// This is a public contract, not a derived value: callers rely on it for
/// pre-flight sizing via [`size_in_bytes`], so its shape must not drift
/// under refactoring.
pub fn record_overhead(magic: i8) -> usize {
    match magic {
        0 => 14, // Crc(4) + MagicByte(1) + Attributes(1) + KeyLength(4) + ValueLength(4)
        1 => 22, // the above, plus Timestamp(8)
        _ => unreachable!("magic must be validated to {{0, 1}} before calling record_overhead"),
    }
}

/// The exact number of bytes a plain (uncompressed) `append` of this record
/// would add to the builder's buffer.
pub fn size_in_bytes(magic: i8, key: Option<&[u8]>, value: Option<&[u8]>) -> usize {
    record_overhead(magic)
        + 12 // Offset(8) + MessageSize(4)
        + key.map_or(0, |k| k.len())
        + value.map_or(0, |v| v.len())
}

fn validate_magic(magic: i8) -> Result<()> {
    if magic != 0 && magic != 1 {
        bail!(crate::errors::ErrorKind::TypeError(format!(
            "unsupported magic byte {}, expected 0 or 1",
            magic
        )));
    }
    Ok(())
}
