//! The decoded shape of a single legacy message, as produced by
//! [`crate::protocol::reader::Messages`].

use bytes::Bytes;

use crate::protocol::{Offset, Timestamp};

/// Whether a message's timestamp was set by the producer (`CreateTime`) or
/// stamped on by the broker at append time (`LogAppendTime`). Meaningful
/// only for magic=1 batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i8)]
pub enum TimestampType {
    CreateTime = 0,
    LogAppendTime = 1,
}

/// A single message yielded by a reader's iteration, after any compressed
/// wrapper has been transparently expanded.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub offset: Offset,
    /// `None` for magic=0 batches, where the wire format carries no
    /// timestamp field at all.
    pub timestamp: Option<Timestamp>,
    pub timestamp_type: Option<TimestampType>,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
    pub checksum: u32,
}
