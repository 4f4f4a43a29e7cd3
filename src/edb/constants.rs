//! Extensible Storage Engine on-disk format constants.
//!
//! Offsets and sizes below are taken from `esedb_page_block.h` and the
//! database file header layout described by libesedb; see `SPEC_FULL.md`
//! §3/§6 for the full field tables.

/// Size in bytes of the database file header (page 0).
pub const FILE_HEADER_SIZE: usize = 668;

/// Magic signature stored at byte offset 4 of the file header.
pub const FILE_SIGNATURE: u32 = 0x89ab_cdef;

/// Size in bytes of the fixed (non-root) page header.
pub const PAGE_HEADER_SIZE: usize = 40;

/// Additional header bytes present on a page when `PAGE_FLAG_IS_ROOT` is set.
pub const ROOT_PAGE_HEADER_EXTENSION_SIZE: usize = 16;

/// Below this page size, tag array entries are 4 bytes (2+2); at or above
/// it, entries are 8 bytes (4+4).
pub const LARGE_PAGE_TAG_THRESHOLD: u32 = 16384;

/// Size in bytes of one tag array entry in the legacy (small page) layout.
pub const PAGE_TAG_SIZE_SMALL: usize = 4;

/// Size in bytes of one tag array entry in the large page layout.
pub const PAGE_TAG_SIZE_LARGE: usize = 8;

/// Fixed page number of the database-level root page.
pub const DATABASE_PAGE_NUMBER: u32 = 1;

/// Fixed page number of the catalog's root page.
pub const CATALOG_PAGE_NUMBER: u32 = 4;

/// Format version at which the legacy single-XOR checksum was replaced by
/// the dual XOR-32 + ECC-32 scheme.
pub const FORMAT_VERSION_WITH_ECC: u32 = 0x620;

/// Format revision threshold (inclusive) below which the legacy checksum
/// still applies even at `FORMAT_VERSION_WITH_ECC`.
pub const LEGACY_CHECKSUM_MAX_REVISION: u32 = 2;

/// Page header flag bits, offset 36 of the page header.
pub mod page_flags {
    pub const IS_ROOT: u32 = 0x0000_0001;
    pub const IS_LEAF: u32 = 0x0000_0002;
    pub const IS_PARENT: u32 = 0x0000_0004;
    pub const IS_EMPTY: u32 = 0x0000_0008;
    pub const IS_SPACE_TREE: u32 = 0x0000_0020;
    pub const IS_INDEX: u32 = 0x0000_0040;
    pub const IS_LONG_VALUE: u32 = 0x0000_0080;
    pub const IS_NEW_RECORD_FORMAT: u32 = 0x0000_2000;
    pub const IS_SCRUBBED: u32 = 0x0000_4000;
}

/// Flag bits packed into the high bits of each page tag's value-size field.
pub mod tag_flags {
    /// The tag's value begins with a `common_key_size` prefix-compression
    /// header (see `libesedb_page_tree_value.h`).
    pub const HAS_COMMON_KEY_SIZE: u16 = 0x2000;
    /// The tag has been deleted/is unused; its value bytes are stale.
    pub const IS_DEFUNCT: u16 = 0x4000;
    pub const MASK: u16 = 0xe000;
    pub const VALUE_SIZE_MASK: u16 = 0x1fff;
}

/// Page-tree key types (`libesedb_page_tree_key.h`).
pub mod key_type {
    pub const INDEX_VALUE: u8 = 0;
    pub const LONG_VALUE: u8 = 1;
    pub const LONG_VALUE_SEGMENT: u8 = 2;
    pub const BRANCH: u8 = 3;
    pub const LEAF: u8 = 4;
}

/// Catalog entry `type` field values.
pub mod catalog_type {
    pub const TABLE: u16 = 1;
    pub const COLUMN: u16 = 2;
    pub const INDEX: u16 = 3;
    pub const LONG_VALUE: u16 = 4;
    pub const CALLBACK: u16 = 5;
}

/// Column data type codes (`JET_coltyp`), as stored in catalog column
/// entries.
pub mod column_type {
    pub const NIL: u32 = 0;
    pub const BOOLEAN: u32 = 1;
    pub const UNSIGNED_BYTE: u32 = 2;
    pub const SHORT: u32 = 3;
    pub const LONG: u32 = 4;
    pub const CURRENCY: u32 = 5;
    pub const IEEE_SINGLE: u32 = 6;
    pub const IEEE_DOUBLE: u32 = 7;
    pub const DATE_TIME: u32 = 8;
    pub const BINARY: u32 = 9;
    pub const TEXT: u32 = 10;
    pub const LONG_BINARY: u32 = 11;
    pub const LONG_TEXT: u32 = 12;
    pub const SUPER_LONG_VALUE: u32 = 13;
    pub const UNSIGNED_LONG: u32 = 14;
    pub const LONG_LONG: u32 = 15;
    pub const GUID: u32 = 16;
    pub const UNSIGNED_SHORT: u32 = 17;
}

/// Column flag bits (`JET_colflag`), relevant subset.
pub mod column_flags {
    pub const FIXED: u32 = 0x0000_0001;
    pub const TAGGED: u32 = 0x0000_0002;
    pub const NOT_NULL: u32 = 0x0000_0004;
    pub const VERSION: u32 = 0x0000_0008;
    pub const AUTO_INCREMENT: u32 = 0x0000_0010;
    pub const MULTI_VALUED: u32 = 0x0000_0400;
    pub const COMPRESSED: u32 = 0x0010_0000;
}

/// Per-value flags carried in the leading byte of a NEW_RECORD_FORMAT
/// tagged-column value (spec.md §4.9). `libesedb_record.c` was not part of
/// the retained `original_source/` subset (only `esedb_page_block.h` and
/// the page-tree/key/data-segment sources were kept), so these are the bit
/// values documented consistently across libesedb-derived ESE readers
/// rather than a verbatim port; see DESIGN.md.
pub mod tagged_value_flags {
    pub const VARIABLE_SIZE: u8 = 0x01;
    pub const COMPRESSED: u8 = 0x02;
    pub const LONG_VALUE: u8 = 0x04;
    pub const MULTI_VALUE: u8 = 0x08;
}

/// Codepage identifiers used by TEXT/LARGE_TEXT columns.
pub mod codepage {
    pub const UNICODE: u16 = 1200;
    pub const ASCII: u16 = 1252;
    pub const WESTERN_EUROPEAN: u16 = 28591;
}
