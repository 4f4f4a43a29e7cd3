//! Column value decompressors.
//!
//! Two schemes are recognized, distinguished by the first byte of the
//! compressed payload (`esedbtools` calls this the "compression header"
//! byte):
//!
//! - **7-bit ASCII** (`ascii7.c`): every byte after the header is XORed
//!   with a mask that cycles on its position, then a NUL terminator is
//!   appended.
//! - **Byte-stream / Windows Search run-length** (`windows_search_compression.c`):
//!   expands to UTF-16LE by pairing each of a run of literal low bytes
//!   with one shared high byte, run after run.

use crate::edb::error::{CompressionErrorKind, EdbError};

const COMPRESSION_HEADER_7BIT_ASCII: u8 = 0x00;
const COMPRESSION_HEADER_7BIT_ASCII_HIGH: u8 = 0x01;
const COMPRESSION_HEADER_BYTE_STREAM: u8 = 0x18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    SevenBitAscii,
    ByteStream,
    None,
}

pub fn detect_scheme(compressed: &[u8]) -> CompressionScheme {
    match compressed.first() {
        Some(&COMPRESSION_HEADER_7BIT_ASCII) | Some(&COMPRESSION_HEADER_7BIT_ASCII_HIGH) => {
            CompressionScheme::SevenBitAscii
        }
        Some(&COMPRESSION_HEADER_BYTE_STREAM) => CompressionScheme::ByteStream,
        _ => CompressionScheme::None,
    }
}

/// Decompress a column value, dispatching on its leading header byte.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, EdbError> {
    match detect_scheme(compressed) {
        CompressionScheme::SevenBitAscii => decompress_7bit_ascii(compressed),
        CompressionScheme::ByteStream => decompress_byte_stream(compressed),
        CompressionScheme::None => Ok(compressed.to_vec()),
    }
}

/// The literal size the upstream `ascii7_decompress` size function
/// reports: `compressed_data_size` unchanged. (A once-proposed "corrected"
/// formula of `(n-1)*2+2` does not match the actual decompress loop and is
/// intentionally not used here.)
pub fn ascii7_decompressed_size(compressed_data_size: usize) -> usize {
    compressed_data_size
}

/// Expand a 7-bit-ASCII compressed column value.
///
/// Ported from `esedbtools/ascii7.c`'s `ascii7_decompress_to_utf8_string`:
/// the first byte is a bitmask prelude that never itself appears in the
/// output; every following byte at (1-based, whole-buffer) index `i` is
/// XORed with a mask that cycles on `i mod 4`:
///
/// - `i mod 4 == 0`: `bitmask_prelude XOR (i + 1)`
/// - `i mod 4 == 1`: `i`, minus 1 when `compressed_data_size <= 256`
/// - `i mod 4 == 2`: `i`
/// - `i mod 4 == 3`: `i XOR 0x05`
///
/// A trailing NUL terminator is appended, matching the source's
/// NUL-terminated-C-string convention (and why
/// [`ascii7_decompressed_size`] reports the literal `compressed_data_size`
/// rather than `compressed_data_size - 1`: the terminator makes up for the
/// header byte that contributes no output character of its own).
fn decompress_7bit_ascii(compressed: &[u8]) -> Result<Vec<u8>, EdbError> {
    if compressed.len() <= 1 {
        return Err(EdbError::compression(
            CompressionErrorKind::DecompressFailed,
            "7-bit ASCII payload too small",
        ));
    }
    let compressed_data_size = compressed.len();
    let prelude = compressed[0];

    let mut out = Vec::with_capacity(compressed_data_size);
    for i in 1..compressed_data_size {
        let mask: u8 = match i % 4 {
            0 => prelude ^ ((i as u8).wrapping_add(1)),
            1 => {
                let m = i as u8;
                if compressed_data_size <= 256 {
                    m.wrapping_sub(1)
                } else {
                    m
                }
            }
            2 => i as u8,
            3 => (i as u8) ^ 0x05,
            _ => unreachable!(),
        };
        out.push(compressed[i] ^ mask);
    }
    out.push(0);

    Ok(out)
}

/// Expand a byte-stream (Windows Search) run-length compressed column
/// value into UTF-16LE text.
///
/// Ported from `esedbtools/windows_search_compression.c`'s
/// `windows_search_utf16_run_length_compression_get_size`/`_decompress`:
/// after the 1-byte header, the stream is a sequence of runs. Each run is
/// `run_length: u8` followed by `high_byte: u8`, followed by
/// `run_length` literal low bytes; every literal low byte is paired with
/// the run's `high_byte` to produce one UTF-16LE code unit. If a run's
/// declared length would read past the end of the input, it is silently
/// truncated to however many literal bytes actually remain — the
/// upstream encoder is known to occasionally emit a dangling final run.
fn decompress_byte_stream(compressed: &[u8]) -> Result<Vec<u8>, EdbError> {
    if compressed.is_empty() {
        return Err(EdbError::compression(
            CompressionErrorKind::DecompressFailed,
            "empty byte-stream payload",
        ));
    }
    let compressed_data_size = compressed.len();
    let mut offset = 1usize; // skip header byte
    let mut out = Vec::new();

    loop {
        if offset >= compressed_data_size.saturating_sub(1) {
            break;
        }

        let mut run_length = compressed[offset] as usize;
        offset += 1;

        // `offset` now points at high_byte; the literal bytes that follow
        // it must fit in what remains.
        if offset + run_length >= compressed_data_size {
            run_length = compressed_data_size.saturating_sub(offset + 1);
        }

        let high_byte = compressed[offset];
        offset += 1;

        for _ in 0..run_length {
            if offset >= compressed_data_size {
                break;
            }
            out.push(compressed[offset]);
            out.push(high_byte);
            offset += 1;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_scheme_ascii() {
        assert_eq!(
            detect_scheme(&[0x00, 0x41]),
            CompressionScheme::SevenBitAscii
        );
    }

    #[test]
    fn test_detect_scheme_byte_stream() {
        assert_eq!(
            detect_scheme(&[0x18, 0x03, b'x']),
            CompressionScheme::ByteStream
        );
    }

    #[test]
    fn test_detect_scheme_none() {
        assert_eq!(detect_scheme(&[0xff, 0x01]), CompressionScheme::None);
    }

    #[test]
    fn test_byte_stream_expands_run_to_utf16_pairs() {
        // header, run_length=2, high_byte=0x00, then two literal low bytes
        let compressed = vec![COMPRESSION_HEADER_BYTE_STREAM, 2, 0x00, b'h', b'i'];
        let out = decompress_byte_stream(&compressed).unwrap();
        assert_eq!(out, vec![b'h', 0x00, b'i', 0x00]);
    }

    #[test]
    fn test_byte_stream_tolerates_truncated_run() {
        // run_length claims 10 literal bytes follow, but only one does.
        let compressed = vec![COMPRESSION_HEADER_BYTE_STREAM, 10, 0x00, b'z'];
        let out = decompress_byte_stream(&compressed).unwrap();
        assert_eq!(out, vec![b'z', 0x00]);
    }

    #[test]
    fn test_ascii7_size_is_literal() {
        assert_eq!(ascii7_decompressed_size(40), 40);
    }

    #[test]
    fn test_decompress_dispatches() {
        let out = decompress(&[0x18, 1, 0x00, b'q']).unwrap();
        assert_eq!(out, vec![b'q', 0x00]);
    }

    #[test]
    fn test_decompress_empty_ascii_is_error() {
        assert!(decompress_7bit_ascii(&[]).is_err());
    }

    #[test]
    fn test_decompress_7bit_ascii_masks_match_source() {
        // i=1: mask = 1 - 1 = 0 (size <= 256); i=2: mask = 2; then a NUL
        // terminator, matching `ascii7_decompress_to_utf8_string` exactly.
        let compressed = vec![0x00u8, 0x48, 0x44];
        let out = decompress_7bit_ascii(&compressed).unwrap();
        assert_eq!(out, vec![0x48, 0x46, 0x00]);
    }
}
