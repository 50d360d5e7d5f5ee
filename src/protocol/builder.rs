//! Appends plain messages into a growing buffer and, on `build`, wraps them
//! in a single compressed envelope (or leaves them as-is for `None`).

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::checksum;
use crate::compression::{standard_codecs, CodecRegistry, CompressionType};
use crate::cursor::Writer;
use crate::errors::{ErrorKind, Result};
use crate::protocol::{record_overhead, size_in_bytes, validate_magic, Offset, Timestamp};

/// Wall-clock time in milliseconds, used to stamp a magic=1 record whose
/// caller passed no explicit timestamp. `CreateTime` with an implied "now"
/// is the same substitution the reference client makes at the call site.
fn current_time_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// What a single `append` call cost and was stamped with.
///
/// `timestamp` mirrors the source library's sentinel: `-1` for magic=0
/// batches, where the wire format has no timestamp field to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordMetadata {
    pub offset: Offset,
    pub crc: u32,
    pub size: usize,
    pub timestamp: Timestamp,
}

impl ::std::fmt::Display for RecordMetadata {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(
            f,
            "LegacyRecordMetadata(offset={}, crc={}, size={}, timestamp={})",
            self.offset, self.crc, self.size, self.timestamp
        )
    }
}

/// Builds one legacy message set. Every appended record is written plain
/// (`Attributes = 0`, `CreateTime`); [`build`](LegacyBatchBuilder::build)
/// is the only place compression bits are ever set, on the single outer
/// envelope that wraps the whole run.
///
/// `build` consumes `self`: once called, there is no buffer left to append
/// to, which the type system enforces rather than a runtime "already built"
/// flag.
pub struct LegacyBatchBuilder {
    magic: i8,
    compression_type: CompressionType,
    batch_size: usize,
    codecs: Arc<dyn CodecRegistry>,
    writer: Writer,
    last_offset: Offset,
    record_count: usize,
    max_timestamp: Timestamp,
}

impl LegacyBatchBuilder {
    /// Builds against the statically-linked codecs in this crate.
    pub fn new(magic: i8, compression_type: CompressionType, batch_size: usize) -> Result<Self> {
        Self::with_codecs(magic, compression_type, batch_size, standard_codecs())
    }

    /// Builds against an explicit [`CodecRegistry`], e.g. one that reports a
    /// codec unavailable for a test.
    pub fn with_codecs(
        magic: i8,
        compression_type: CompressionType,
        batch_size: usize,
        codecs: Arc<dyn CodecRegistry>,
    ) -> Result<Self> {
        validate_magic(magic)?;
        if magic == 0 && compression_type == CompressionType::Lz4 {
            bail!(ErrorKind::UnsupportedCodec(
                "LZ4 compression requires magic=1".to_owned()
            ));
        }
        codecs.require_available(compression_type)?;

        Ok(LegacyBatchBuilder {
            magic,
            compression_type,
            batch_size,
            codecs,
            writer: Writer::new(),
            last_offset: 0,
            record_count: 0,
            max_timestamp: -1,
        })
    }

    /// Bytes written to the buffer so far, including any earlier appends.
    pub fn size(&self) -> usize {
        self.writer.position()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Appends one record.
    ///
    /// Returns `Ok(None)` rather than an error when the record would push
    /// the buffer past `batch_size` — the batch is simply full. The very
    /// first append is always admitted regardless of its own size, so a
    /// single oversized record still gets a batch to itself.
    pub fn append(
        &mut self,
        offset: Offset,
        timestamp: Option<Timestamp>,
        key: Option<&[u8]>,
        value: Option<&[u8]>,
    ) -> Result<Option<RecordMetadata>> {
        let needed = size_in_bytes(self.magic, key, value);
        if self.record_count > 0 && self.writer.position() + needed > self.batch_size {
            trace!(
                "batch full at {} bytes, refusing record of {} bytes (limit {})",
                self.writer.position(),
                needed,
                self.batch_size
            );
            return Ok(None);
        }

        let ts = if self.magic == 1 {
            timestamp.unwrap_or_else(current_time_millis)
        } else {
            timestamp.unwrap_or(0)
        };
        let start = self.writer.position();

        self.writer.write_i64(offset);
        let size_pos = self.writer.position();
        self.writer.write_i32(0);
        let crc_pos = self.writer.position();
        self.writer.write_u32(0);
        let crc_region_start = self.writer.position();

        self.writer.write_i8(self.magic);
        self.writer.write_i8(0); // plain record: no compression, CreateTime
        if self.magic == 1 {
            self.writer.write_i64(ts);
        }
        self.writer.write_bytes_field(key);
        self.writer.write_bytes_field(value);

        let end = self.writer.position();
        let crc = checksum::checksum_ieee(&self.writer.as_slice()[crc_region_start..end]);
        self.writer.patch_u32(crc_pos, crc);
        self.writer.patch_i32(size_pos, (end - crc_pos) as i32);

        self.last_offset = offset;
        self.record_count += 1;
        if self.magic == 1 {
            self.max_timestamp = self.max_timestamp.max(ts);
        }

        Ok(Some(RecordMetadata {
            offset,
            crc,
            size: end - start,
            timestamp: if self.magic == 1 { ts } else { -1 },
        }))
    }

    /// Finishes the batch. For `CompressionType::None` this is just the
    /// concatenated plain records; otherwise the whole run is compressed
    /// into the `Value` of a single outer record whose own `Offset` is the
    /// last appended offset (a broker rewrites this in place) and whose
    /// `Timestamp` (magic=1 only) is the maximum timestamp of the records
    /// it wraps.
    pub fn build(self) -> Result<Vec<u8>> {
        let LegacyBatchBuilder {
            magic,
            compression_type,
            codecs,
            writer,
            last_offset,
            max_timestamp,
            record_count,
            ..
        } = self;

        if compression_type == CompressionType::None {
            return Ok(writer.into_inner());
        }

        let inner = writer.into_inner();
        debug!(
            "compressing {} records ({} bytes) with {}",
            record_count, inner.len(), compression_type
        );
        let compressed = codecs.compress(compression_type, &inner)?;

        let mut out = Writer::with_capacity(compressed.len() + record_overhead(magic) + 12);
        out.write_i64(last_offset);
        let size_pos = out.position();
        out.write_i32(0);
        let crc_pos = out.position();
        out.write_u32(0);
        let crc_region_start = out.position();

        out.write_i8(magic);
        out.write_i8(compression_type.bits());
        if magic == 1 {
            out.write_i64(max_timestamp.max(0));
        }
        out.write_bytes_field(None);
        out.write_bytes_field(Some(&compressed));

        let end = out.position();
        let crc = checksum::checksum_ieee(&out.as_slice()[crc_region_start..end]);
        out.patch_u32(crc_pos, crc);
        out.patch_i32(size_pos, (end - crc_pos) as i32);

        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_append_matches_size_in_bytes() {
        let mut builder = LegacyBatchBuilder::new(1, CompressionType::None, 1_000_000).unwrap();
        let pos = builder.size();
        builder
            .append(0, Some(1234), Some(b"test"), Some(b"Super"))
            .unwrap();
        assert_eq!(
            builder.size() - pos,
            size_in_bytes(1, Some(b"test"), Some(b"Super"))
        );
    }

    #[test]
    fn first_append_is_always_admitted_even_if_oversized() {
        let mut builder = LegacyBatchBuilder::new(0, CompressionType::None, 1024).unwrap();
        let huge = vec![0u8; 2000];
        let meta = builder.append(0, None, None, Some(&huge)).unwrap();
        assert!(meta.is_some());
    }

    #[test]
    fn append_refuses_once_batch_size_would_be_exceeded() {
        let mut builder = LegacyBatchBuilder::new(0, CompressionType::None, 1000).unwrap();
        let chunk = vec![0u8; 700];
        let first = builder.append(0, None, None, Some(&chunk)).unwrap();
        assert!(first.is_some());
        let second = builder.append(1, None, None, Some(&chunk)).unwrap();
        assert!(second.is_none());
        assert!(builder.size() < 1000);
    }

    #[test]
    fn known_crc_fixture_magic_zero() {
        // Offset(8) + MessageSize(4) + Crc(4) + Magic(1) + Attributes(1)
        // + KeyLength(4) + "test"(4) + ValueLength(4) + "Super"(5) = 35.
        let mut builder = LegacyBatchBuilder::new(0, CompressionType::None, 1_000_000).unwrap();
        let meta = builder
            .append(0, Some(9_999_999), Some(b"test"), Some(b"Super"))
            .unwrap()
            .unwrap();
        assert_eq!(meta.crc, 278_251_978);
        assert_eq!(builder.build().unwrap().len(), 35);
    }

    #[test]
    fn known_crc_fixture_magic_one() {
        // As above, plus the v1 Timestamp(8) field = 43.
        let mut builder = LegacyBatchBuilder::new(1, CompressionType::None, 1_000_000).unwrap();
        let meta = builder
            .append(0, Some(9_999_999), Some(b"test"), Some(b"Super"))
            .unwrap()
            .unwrap();
        assert_eq!(meta.crc, 2_199_891_077);
        assert_eq!(builder.build().unwrap().len(), 43);
    }

    #[test]
    fn known_crc_fixture_table() {
        let fixtures: &[(Option<&[u8]>, Option<&[u8]>, u32, u32)] = &[
            (Some(b"test"), None, 580_701_536, 164_492_157),
            (None, Some(b"Super"), 2_797_021_502, 3_315_209_433),
            (Some(b""), Some(b"Super"), 1_446_809_667, 890_351_012),
            (Some(b"test"), Some(b""), 4_230_475_139, 3_614_888_862),
        ];

        for &(key, value, crc_v0, crc_v1) in fixtures {
            let mut v0 = LegacyBatchBuilder::new(0, CompressionType::None, 1_000_000).unwrap();
            let meta = v0.append(0, Some(9_999_999), key, value).unwrap().unwrap();
            assert_eq!(meta.crc, crc_v0, "magic=0 key={:?} value={:?}", key, value);

            let mut v1 = LegacyBatchBuilder::new(1, CompressionType::None, 1_000_000).unwrap();
            let meta = v1.append(0, Some(9_999_999), key, value).unwrap().unwrap();
            assert_eq!(meta.crc, crc_v1, "magic=1 key={:?} value={:?}", key, value);
        }
    }

    #[test]
    fn magic_zero_metadata_reports_sentinel_timestamp() {
        let mut builder = LegacyBatchBuilder::new(0, CompressionType::None, 1_000_000).unwrap();
        let meta = builder
            .append(0, None, Some(b"test"), Some(b"Super"))
            .unwrap()
            .unwrap();
        assert_eq!(meta.timestamp, -1);
    }

    #[test]
    fn magic_one_metadata_reports_the_given_timestamp() {
        let mut builder = LegacyBatchBuilder::new(1, CompressionType::None, 1_000_000).unwrap();
        let meta = builder
            .append(5, Some(9_999_999), Some(b"123"), None)
            .unwrap()
            .unwrap();
        assert_eq!(meta.timestamp, 9_999_999);
    }

    #[test]
    fn magic_one_append_with_null_timestamp_substitutes_wall_clock_time() {
        let before = current_time_millis();
        let mut builder = LegacyBatchBuilder::new(1, CompressionType::None, 1_000_000).unwrap();
        let meta = builder.append(0, None, None, None).unwrap().unwrap();
        let after = current_time_millis();
        assert!(meta.timestamp >= before && meta.timestamp <= after);
    }

    #[test]
    fn lz4_is_rejected_for_magic_zero_at_construction() {
        assert!(LegacyBatchBuilder::new(0, CompressionType::Lz4, 1_000_000).is_err());
    }

    #[test]
    fn exact_buffer_length_for_three_plain_appends() {
        let mut builder = LegacyBatchBuilder::new(0, CompressionType::None, 1_000_000).unwrap();
        builder.append(0, None, None, Some(b"123")).unwrap();
        builder.append(1, None, None, Some(b"some string")).unwrap();
        builder
            .append(5, Some(9_999_999), Some(b"123"), None)
            .unwrap();
        let buf = builder.build().unwrap();
        assert_eq!(buf.len(), 95);
    }

    #[test]
    fn exact_buffer_length_for_three_plain_appends_magic_one() {
        let mut builder = LegacyBatchBuilder::new(1, CompressionType::None, 1_000_000).unwrap();
        builder.append(0, None, None, Some(b"123")).unwrap();
        builder.append(1, None, None, Some(b"some string")).unwrap();
        builder
            .append(5, Some(9_999_999), Some(b"123"), None)
            .unwrap();
        let buf = builder.build().unwrap();
        assert_eq!(buf.len(), 119);
    }

    #[test]
    fn record_metadata_display_matches_reference_format() {
        let meta = RecordMetadata {
            offset: 0,
            crc: 278_251_978,
            size: 26,
            timestamp: -1,
        };
        assert_eq!(
            meta.to_string(),
            "LegacyRecordMetadata(offset=0, crc=278251978, size=26, timestamp=-1)"
        );
    }
}
