#![recursion_limit = "128"]
#![allow(dead_code)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate error_chain;

pub mod assignor;
pub mod broker_error;
pub mod compression;
mod checksum;
mod cursor;
#[macro_use]
pub mod errors;
pub mod protocol;

pub use assignor::{Assignment, PartitionAssignor, Subscription};
pub use broker_error::{for_code, BrokerErrorKind};
pub use compression::{standard_codecs, CodecRegistry, CompressionType};
pub use errors::{Error, ErrorKind, Result};
pub use protocol::{
    record_overhead, size_in_bytes, LegacyBatchBuilder, LegacyBatchReader, Message, Messages,
    Offset, RecordMetadata, Timestamp, TimestampType,
};
