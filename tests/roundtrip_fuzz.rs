//! Property-based checks for the round-trip law: anything that goes into a
//! builder through `append` comes back out of a reader unchanged, no matter
//! which compression codec (or none) wraps it.

use kafka_legacy_codec::{CompressionType, LegacyBatchBuilder, LegacyBatchReader};
use quickcheck::quickcheck;

fn roundtrip(magic: i8, compression: CompressionType, records: Vec<(Vec<u8>, Vec<u8>)>) -> bool {
    let mut builder = match LegacyBatchBuilder::new(magic, compression, 10 * 1024 * 1024) {
        Ok(builder) => builder,
        Err(_) => return true, // e.g. LZ4 + magic=0, rejected at construction.
    };

    let mut appended = Vec::new();
    for (i, (key, value)) in records.into_iter().enumerate() {
        let offset = i as i64;
        match builder.append(offset, Some(0), Some(&key), Some(&value)) {
            Ok(Some(_)) => appended.push((offset, key, value)),
            Ok(None) => break, // batch_size is generous but not infinite.
            Err(_) => return false,
        }
    }

    let buf = match builder.build() {
        Ok(buf) => buf,
        Err(_) => return false,
    };

    let messages: Result<Vec<_>, _> = LegacyBatchReader::new(&buf).iter().collect();
    let messages = match messages {
        Ok(messages) => messages,
        Err(_) => return false,
    };

    if messages.len() != appended.len() {
        return false;
    }

    messages
        .into_iter()
        .zip(appended.into_iter())
        .all(|(got, (offset, key, value))| {
            got.offset == offset
                && got.key.as_deref() == Some(&key[..])
                && got.value.as_deref() == Some(&value[..])
        })
}

quickcheck! {
    fn roundtrips_uncompressed(magic: bool, records: Vec<(Vec<u8>, Vec<u8>)>) -> bool {
        roundtrip(if magic { 1 } else { 0 }, CompressionType::None, records)
    }

    fn roundtrips_gzip(magic: bool, records: Vec<(Vec<u8>, Vec<u8>)>) -> bool {
        roundtrip(if magic { 1 } else { 0 }, CompressionType::Gzip, records)
    }

    fn roundtrips_snappy(magic: bool, records: Vec<(Vec<u8>, Vec<u8>)>) -> bool {
        roundtrip(if magic { 1 } else { 0 }, CompressionType::Snappy, records)
    }

    fn roundtrips_lz4(records: Vec<(Vec<u8>, Vec<u8>)>) -> bool {
        // LZ4 is magic=1 only.
        roundtrip(1, CompressionType::Lz4, records)
    }

    fn crc_is_independent_of_batch_compression(key: Vec<u8>, value: Vec<u8>) -> bool {
        let mut plain = LegacyBatchBuilder::new(1, CompressionType::None, 10 * 1024 * 1024).unwrap();
        let plain_meta = plain.append(0, Some(0), Some(&key), Some(&value)).unwrap().unwrap();

        let mut compressed = LegacyBatchBuilder::new(1, CompressionType::Gzip, 10 * 1024 * 1024).unwrap();
        let compressed_meta = compressed.append(0, Some(0), Some(&key), Some(&value)).unwrap().unwrap();

        plain_meta.crc == compressed_meta.crc
    }
}
