//! Page header and tag array parsing.
//!
//! Every page begins with a fixed 40-byte header (`esedb_page_block.h`).
//! Root pages carry an additional 16-byte extension immediately after it.
//! Following the header (and extension, if present) is the page data
//! region, and at the very end of the page, growing backwards, the tag
//! array: one entry per value stored on the page, each holding that
//! value's offset and size within the data region.

use byteorder::{ByteOrder, LittleEndian};

use crate::edb::constants::*;
use crate::edb::error::{EdbError, InputErrorKind};

/// The 40-byte fixed page header.
#[derive(Debug, Clone)]
pub struct PageHeader {
    pub xor_checksum: u32,
    /// Either the page number (legacy XOR pages) or the ECC-32 checksum
    /// (current XOR+ECC pages) — caller disambiguates via the database
    /// format version/revision.
    pub page_number_or_ecc_checksum: u32,
    pub modification_time: u64,
    pub previous_page: u32,
    pub next_page: u32,
    pub father_object_id: u32,
    pub available_data_size: u16,
    pub available_uncommitted_data_size: u16,
    pub available_data_offset: u16,
    pub available_page_tag_count: u16,
    pub flags: u32,
}

/// The 16-byte extension present only when `page_flags::IS_ROOT` is set.
#[derive(Debug, Clone)]
pub struct RootPageExtension {
    pub initial_number_of_pages: u32,
    pub parent_father_data_page_number: u32,
    pub extent_space: u32,
    pub space_tree_page_number: u32,
}

impl PageHeader {
    pub fn parse(data: &[u8]) -> Result<Self, EdbError> {
        if data.len() < PAGE_HEADER_SIZE {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                format!(
                    "page too small for header: {} bytes (need {})",
                    data.len(),
                    PAGE_HEADER_SIZE
                ),
            ));
        }

        Ok(PageHeader {
            xor_checksum: LittleEndian::read_u32(&data[0..4]),
            page_number_or_ecc_checksum: LittleEndian::read_u32(&data[4..8]),
            modification_time: LittleEndian::read_u64(&data[8..16]),
            previous_page: LittleEndian::read_u32(&data[16..20]),
            next_page: LittleEndian::read_u32(&data[20..24]),
            father_object_id: LittleEndian::read_u32(&data[24..28]),
            available_data_size: LittleEndian::read_u16(&data[28..30]),
            available_uncommitted_data_size: LittleEndian::read_u16(&data[30..32]),
            available_data_offset: LittleEndian::read_u16(&data[32..34]),
            available_page_tag_count: LittleEndian::read_u16(&data[34..36]),
            flags: LittleEndian::read_u32(&data[36..40]),
        })
    }

    pub fn is_root(&self) -> bool {
        self.flags & page_flags::IS_ROOT != 0
    }

    pub fn is_leaf(&self) -> bool {
        self.flags & page_flags::IS_LEAF != 0
    }

    pub fn is_parent(&self) -> bool {
        self.flags & page_flags::IS_PARENT != 0
    }

    pub fn is_empty(&self) -> bool {
        self.flags & page_flags::IS_EMPTY != 0
    }

    pub fn is_long_value(&self) -> bool {
        self.flags & page_flags::IS_LONG_VALUE != 0
    }

    pub fn is_index(&self) -> bool {
        self.flags & page_flags::IS_INDEX != 0
    }
}

impl RootPageExtension {
    pub fn parse(data: &[u8]) -> Result<Self, EdbError> {
        if data.len() < ROOT_PAGE_HEADER_EXTENSION_SIZE {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                "page too small for root header extension",
            ));
        }
        Ok(RootPageExtension {
            initial_number_of_pages: LittleEndian::read_u32(&data[0..4]),
            parent_father_data_page_number: LittleEndian::read_u32(&data[4..8]),
            extent_space: LittleEndian::read_u32(&data[8..12]),
            space_tree_page_number: LittleEndian::read_u32(&data[12..16]),
        })
    }
}

/// One entry from the page tag array: a value's offset and size within the
/// page's data region, plus the flag bits packed into the high bits of the
/// size field.
#[derive(Debug, Clone, Copy)]
pub struct PageTag {
    pub value_offset: u16,
    pub value_size: u16,
    pub has_common_key_size: bool,
    pub is_defunct: bool,
}

/// A fully parsed page: header, optional root extension, and tag array,
/// plus the raw bytes backing the data region.
pub struct Page {
    pub header: PageHeader,
    pub root_extension: Option<RootPageExtension>,
    pub tags: Vec<PageTag>,
    data: Vec<u8>,
}

impl Page {
    pub fn parse(data: Vec<u8>, page_size: u32) -> Result<Self, EdbError> {
        let header = PageHeader::parse(&data)?;

        let mut data_start = PAGE_HEADER_SIZE;
        let root_extension = if header.is_root() {
            let ext = RootPageExtension::parse(&data[data_start..])?;
            data_start += ROOT_PAGE_HEADER_EXTENSION_SIZE;
            Some(ext)
        } else {
            None
        };

        let tag_count = header.available_page_tag_count as usize;
        let tag_size = if page_size < LARGE_PAGE_TAG_THRESHOLD {
            PAGE_TAG_SIZE_SMALL
        } else {
            PAGE_TAG_SIZE_LARGE
        };

        let mut tags = Vec::with_capacity(tag_count);
        for i in 0..tag_count {
            let tag_offset = data.len().saturating_sub((i + 1) * tag_size);
            if tag_offset + tag_size > data.len() {
                return Err(EdbError::input(
                    InputErrorKind::InvalidData,
                    "page tag array extends past end of page",
                ));
            }
            let tag_bytes = &data[tag_offset..tag_offset + tag_size];
            tags.push(parse_tag(tag_bytes, tag_size));
        }

        Ok(Page {
            header,
            root_extension,
            tags,
            data,
        })
    }

    /// The raw bytes of a tagged value, relative to the start of the data
    /// region (immediately after the header/extension).
    pub fn value_bytes(&self, tag: &PageTag) -> Result<&[u8], EdbError> {
        let region_start = PAGE_HEADER_SIZE
            + self
                .root_extension
                .as_ref()
                .map(|_| ROOT_PAGE_HEADER_EXTENSION_SIZE)
                .unwrap_or(0);
        let start = region_start + tag.value_offset as usize;
        let end = start + tag.value_size as usize;
        self.data.get(start..end).ok_or_else(|| {
            EdbError::input(
                InputErrorKind::InvalidData,
                format!("page tag value [{start}..{end}) out of bounds"),
            )
        })
    }
}

fn parse_tag(bytes: &[u8], tag_size: usize) -> PageTag {
    if tag_size == PAGE_TAG_SIZE_SMALL {
        let value_offset = LittleEndian::read_u16(&bytes[0..2]);
        let raw_size = LittleEndian::read_u16(&bytes[2..4]);
        PageTag {
            value_offset: value_offset & tag_flags::VALUE_SIZE_MASK,
            value_size: raw_size & tag_flags::VALUE_SIZE_MASK,
            has_common_key_size: raw_size & tag_flags::HAS_COMMON_KEY_SIZE != 0,
            is_defunct: raw_size & tag_flags::IS_DEFUNCT != 0,
        }
    } else {
        let value_offset = LittleEndian::read_u32(&bytes[0..4]);
        let raw_size = LittleEndian::read_u32(&bytes[4..8]);
        PageTag {
            value_offset: (value_offset & tag_flags::VALUE_SIZE_MASK as u32) as u16,
            value_size: (raw_size & tag_flags::VALUE_SIZE_MASK as u32) as u16,
            has_common_key_size: raw_size & tag_flags::HAS_COMMON_KEY_SIZE as u32 != 0,
            is_defunct: raw_size & tag_flags::IS_DEFUNCT as u32 != 0,
        }
    }
}
