//! Long-value (LV) store access: resolving a `SuperLargeValue`/large
//! binary/text column's long-value identifier into its full byte string,
//! which may span many segments across the long-value page tree.
//!
//! A long value's leaf keys are the big-endian concatenation of its
//! `long_value_id` (4 bytes) and a `segment_offset` (4 bytes). Segment 0
//! is not payload: it is a small header recording `total_size` and
//! `reference_count` (`libesedb_data_segment.c`). Payload begins at
//! segment 1, each segment holding up to the page's data area capacity
//! worth of bytes, concatenated in segment-offset order.

use byteorder::{BigEndian, ByteOrder};

use crate::edb::error::{EdbError, InputErrorKind};
use crate::edb::pagetree::{LeafValue, PageSource, PageTreeWalker};
use crate::edb::key::CompatibilityFlags;

/// Header stored in segment 0 of a long value.
#[derive(Debug, Clone, Copy)]
pub struct LongValueHeader {
    pub total_size: u32,
    pub reference_count: u32,
}

impl LongValueHeader {
    pub fn decode(data: &[u8]) -> Result<Self, EdbError> {
        if data.len() < 8 {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                "long value segment-0 header too small",
            ));
        }
        Ok(LongValueHeader {
            total_size: BigEndian::read_u32(&data[0..4]),
            reference_count: BigEndian::read_u32(&data[4..8]),
        })
    }
}

/// Build the big-endian `(long_value_id, segment_offset)` key used to
/// locate one segment in the long-value page tree.
pub fn segment_key(long_value_id: u32, segment_offset: u32) -> [u8; 8] {
    let mut key = [0u8; 8];
    BigEndian::write_u32(&mut key[0..4], long_value_id);
    BigEndian::write_u32(&mut key[4..8], segment_offset);
    key
}

/// Resolve a long value's full contents, given the long-value tree's root
/// page number and the value's identifier.
pub fn resolve<S: PageSource>(
    source: &mut S,
    long_value_root: u32,
    long_value_id: u32,
) -> Result<Vec<u8>, EdbError> {
    let mut walker = PageTreeWalker::new(source, CompatibilityFlags::NONE);
    let all = walker.collect_all(long_value_root)?;

    let mut segments: Vec<&LeafValue> = all
        .iter()
        .filter(|leaf| {
            leaf.key.len() >= 8 && BigEndian::read_u32(&leaf.key[0..4]) == long_value_id
        })
        .collect();

    segments.sort_by_key(|leaf| BigEndian::read_u32(&leaf.key[4..8]));

    if segments.is_empty() {
        return Err(EdbError::input(
            InputErrorKind::InvalidData,
            format!("long value {long_value_id} has no segments"),
        ));
    }

    let header = LongValueHeader::decode(&segments[0].data)?;
    let mut out = Vec::with_capacity(header.total_size as usize);
    for segment in segments.iter().skip(1) {
        out.extend_from_slice(&segment.data);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_key_layout() {
        let key = segment_key(0x0102_0304, 0x0506_0708);
        assert_eq!(key, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
    }

    #[test]
    fn test_header_decode() {
        let mut data = vec![0u8; 8];
        BigEndian::write_u32(&mut data[0..4], 1024);
        BigEndian::write_u32(&mut data[4..8], 2);
        let header = LongValueHeader::decode(&data).unwrap();
        assert_eq!(header.total_size, 1024);
        assert_eq!(header.reference_count, 2);
    }
}
