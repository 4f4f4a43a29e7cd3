//! Page checksum validation.
//!
//! Extensible Storage Engine pages carry one of two checksum schemes
//! depending on the database format version/revision:
//!
//! - **Legacy XOR** (format version < `0x620`, or `0x620` with revision
//!   <= 2): a single 32-bit XOR fold over the page, computed with the
//!   checksum field (bytes 0-3) replaced by the page number before folding.
//!
//! - **Current XOR-32 + ECC-32** (format version `0x620`, revision > 2, and
//!   all later versions): two independent 32-bit checksums computed with
//!   both the checksum field and the ECC field zeroed.
//!
//! The exact ECC-32 fold was not retained in the reference corpus this
//! crate was built against (no `checksum.c` was available); [`ecc32_fold`]
//! isolates that gap so it can be swapped for a fixture-validated
//! implementation without touching the dispatch logic in [`validate`]. Until
//! then, [`validate_xor_ecc`] does not let `ecc32_fold`'s output gate
//! validity — only the XOR-32 half is checked — so real current-format
//! files remain openable; the (known-unreliable) ECC fields are still
//! reported on [`ChecksumResult`] for inspection.

use byteorder::{ByteOrder, LittleEndian};

use crate::edb::constants::{FORMAT_VERSION_WITH_ECC, LEGACY_CHECKSUM_MAX_REVISION};

/// Checksum scheme used by a page, determined from the database format
/// version and revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    /// Single 32-bit XOR fold (format version < 0x620, or 0x620 rev <= 2).
    LegacyXor,
    /// XOR-32 + ECC-32 (format version 0x620 rev > 2, and later).
    XorEcc,
}

/// Result of validating a page's checksum.
#[derive(Debug, Clone)]
pub struct ChecksumResult {
    pub algorithm: ChecksumAlgorithm,
    pub valid: bool,
    pub stored_xor: u32,
    pub calculated_xor: u32,
    pub stored_ecc: Option<u32>,
    pub calculated_ecc: Option<u32>,
}

/// Determine which checksum scheme a page uses, given the database's
/// format version and revision (read from the file header).
pub fn algorithm_for_format(format_version: u32, format_revision: u32) -> ChecksumAlgorithm {
    if format_version < FORMAT_VERSION_WITH_ECC
        || (format_version == FORMAT_VERSION_WITH_ECC
            && format_revision <= LEGACY_CHECKSUM_MAX_REVISION)
    {
        ChecksumAlgorithm::LegacyXor
    } else {
        ChecksumAlgorithm::XorEcc
    }
}

/// Validate a page's checksum against the scheme implied by
/// `format_version`/`format_revision`.
///
/// `page_data` must be exactly one page's worth of bytes, with the header
/// at the front.
pub fn validate(
    page_data: &[u8],
    page_number: u32,
    format_version: u32,
    format_revision: u32,
) -> ChecksumResult {
    match algorithm_for_format(format_version, format_revision) {
        ChecksumAlgorithm::LegacyXor => validate_legacy_xor(page_data, page_number),
        ChecksumAlgorithm::XorEcc => validate_xor_ecc(page_data),
    }
}

fn validate_legacy_xor(page_data: &[u8], page_number: u32) -> ChecksumResult {
    let stored = LittleEndian::read_u32(&page_data[0..4]);

    let mut buf = page_data.to_vec();
    LittleEndian::write_u32(&mut buf[0..4], page_number);
    let calculated = xor32_fold(&buf);

    ChecksumResult {
        algorithm: ChecksumAlgorithm::LegacyXor,
        valid: stored == calculated,
        stored_xor: stored,
        calculated_xor: calculated,
        stored_ecc: None,
        calculated_ecc: None,
    }
}

fn validate_xor_ecc(page_data: &[u8]) -> ChecksumResult {
    let stored_xor = LittleEndian::read_u32(&page_data[0..4]);
    let stored_ecc = LittleEndian::read_u32(&page_data[4..8]);

    let mut buf = page_data.to_vec();
    LittleEndian::write_u32(&mut buf[0..4], 0);
    LittleEndian::write_u32(&mut buf[4..8], 0);

    let calculated_xor = xor32_fold(&buf);
    let calculated_ecc = ecc32_fold(&buf);

    // `ecc32_fold` is a placeholder (see its doc comment): it cannot
    // actually reproduce the stored ECC-32 value, so it must not gate
    // validity or every real current-format page would fail to open.
    // Only the XOR half is load-bearing here; the ECC fields are still
    // surfaced on the result for callers that want to inspect them.
    ChecksumResult {
        algorithm: ChecksumAlgorithm::XorEcc,
        valid: stored_xor == calculated_xor,
        stored_xor,
        calculated_xor,
        stored_ecc: Some(stored_ecc),
        calculated_ecc: Some(calculated_ecc),
    }
}

/// Fold `data` into a single 32-bit value by XORing successive 4-byte
/// little-endian words. `data.len()` need not be a multiple of 4; a short
/// trailing chunk is zero-padded.
fn xor32_fold(data: &[u8]) -> u32 {
    let mut result = 0u32;
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        result ^= LittleEndian::read_u32(chunk);
    }
    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let mut tail = [0u8; 4];
        tail[..remainder.len()].copy_from_slice(remainder);
        result ^= LittleEndian::read_u32(&tail);
    }
    result
}

/// ECC-32 fold. The upstream polynomial was not part of the retained
/// reference sources; this placeholder keeps the XOR-ECC dispatch path
/// shaped correctly and must be replaced with the fixture-derived fold
/// before being relied on for corruption detection.
fn ecc32_fold(data: &[u8]) -> u32 {
    xor32_fold(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_xor_roundtrip() {
        let mut page = vec![0xABu8; 64];
        let page_number = 7u32;
        LittleEndian::write_u32(&mut page[0..4], page_number);
        let folded = xor32_fold(&page);
        LittleEndian::write_u32(&mut page[0..4], folded);

        let result = validate_legacy_xor(&page, page_number);
        assert!(result.valid);
        assert_eq!(result.algorithm, ChecksumAlgorithm::LegacyXor);
    }

    #[test]
    fn test_legacy_xor_mismatch() {
        let mut page = vec![0u8; 64];
        LittleEndian::write_u32(&mut page[0..4], 0xdead_beef);
        let result = validate_legacy_xor(&page, 1);
        assert!(!result.valid);
    }

    #[test]
    fn test_xor_ecc_roundtrip() {
        let mut page = vec![0x11u8; 128];
        LittleEndian::write_u32(&mut page[0..4], 0);
        LittleEndian::write_u32(&mut page[4..8], 0);
        let xor = xor32_fold(&page);
        let ecc = ecc32_fold(&page);
        LittleEndian::write_u32(&mut page[0..4], xor);
        LittleEndian::write_u32(&mut page[4..8], ecc);

        let result = validate_xor_ecc(&page);
        assert!(result.valid);
        assert_eq!(result.algorithm, ChecksumAlgorithm::XorEcc);
    }

    #[test]
    fn test_algorithm_selection() {
        assert_eq!(
            algorithm_for_format(0x600, 0),
            ChecksumAlgorithm::LegacyXor
        );
        assert_eq!(
            algorithm_for_format(0x620, 2),
            ChecksumAlgorithm::LegacyXor
        );
        assert_eq!(algorithm_for_format(0x620, 3), ChecksumAlgorithm::XorEcc);
        assert_eq!(algorithm_for_format(0x630, 0), ChecksumAlgorithm::XorEcc);
    }
}
