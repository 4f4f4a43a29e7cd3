//! File-level access: opening an EDB file, parsing its header, and
//! serving pages through a bounded LRU cache.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::num::NonZeroUsize;
use std::path::Path;
use std::rc::Rc;

use byteorder::{ByteOrder, LittleEndian};
use lru::LruCache;

use crate::edb::checksum;
use crate::edb::constants::{CATALOG_PAGE_NUMBER, DATABASE_PAGE_NUMBER, FILE_HEADER_SIZE};
use crate::edb::error::{EdbError, InputErrorKind, IoErrorKind};
use crate::edb::key::CompatibilityFlags;
use crate::edb::page::Page;
use crate::edb::pagetree::PageSource;

/// Parsed fields from the 668-byte database file header (page 0).
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub signature: u32,
    pub format_version: u32,
    pub file_type: u32,
    pub database_time: u64,
    pub format_revision: u32,
    pub page_size: u32,
    pub database_state: u32,
    pub codepage: u16,
}

impl FileHeader {
    pub fn parse(data: &[u8]) -> Result<Self, EdbError> {
        if data.len() < FILE_HEADER_SIZE {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                format!(
                    "file too small for header: {} bytes (need {FILE_HEADER_SIZE})",
                    data.len()
                ),
            ));
        }

        let signature = LittleEndian::read_u32(&data[4..8]);
        if signature != crate::edb::constants::FILE_SIGNATURE {
            return Err(EdbError::input(
                InputErrorKind::SignatureMismatch,
                format!("unexpected file signature 0x{signature:08x}"),
            ));
        }

        let format_version = LittleEndian::read_u32(&data[8..12]);
        let file_type = LittleEndian::read_u32(&data[12..16]);
        let database_time = LittleEndian::read_u64(&data[16..24]);
        let page_size = LittleEndian::read_u32(&data[236..240]);
        let format_revision = LittleEndian::read_u32(&data[240..244]);
        let database_state = LittleEndian::read_u32(&data[244..248]);
        let codepage = LittleEndian::read_u16(&data[596..598]);

        Ok(FileHeader {
            signature,
            format_version,
            file_type,
            database_time,
            format_revision,
            page_size: if page_size == 0 { 4096 } else { page_size },
            database_state,
            codepage,
        })
    }
}

/// Options controlling how a file is opened.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    pub compatibility: CompatibilityFlags,
    pub page_cache_capacity: usize,
    pub verify_checksums: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            compatibility: CompatibilityFlags::NONE,
            page_cache_capacity: 512,
            verify_checksums: true,
        }
    }
}

/// An open EDB file: header plus an LRU-cached page reader.
pub struct EsedbFile {
    file: File,
    header: FileHeader,
    page_cache: LruCache<u32, Rc<Page>>,
    options: OpenOptions,
}

impl EsedbFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EdbError> {
        Self::open_with_options(path, OpenOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        options: OpenOptions,
    ) -> Result<Self, EdbError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            EdbError::io(
                IoErrorKind::OpenFailed,
                format!("cannot open {}: {e}", path.display()),
            )
        })?;

        let mut header_buf = vec![0u8; FILE_HEADER_SIZE];
        file.read_exact(&mut header_buf).map_err(|e| {
            EdbError::io(
                IoErrorKind::ReadFailed,
                format!("cannot read file header: {e}"),
            )
        })?;
        let header = FileHeader::parse(&header_buf)?;

        let capacity = NonZeroUsize::new(options.page_cache_capacity.max(1)).unwrap();
        Ok(EsedbFile {
            file,
            header,
            page_cache: LruCache::new(capacity),
            options,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn page_size(&self) -> u32 {
        self.header.page_size
    }

    /// Database-level root page number (fixed).
    pub fn database_root(&self) -> u32 {
        DATABASE_PAGE_NUMBER
    }

    /// Catalog root page number (fixed).
    pub fn catalog_root(&self) -> u32 {
        CATALOG_PAGE_NUMBER
    }

    fn read_page_from_disk(&mut self, page_number: u32) -> Result<Rc<Page>, EdbError> {
        let page_size = self.header.page_size as u64;
        // Page 0 is the file header (the primary header occupies the first
        // physical page, with a shadow/backup header at physical page 1),
        // so page N's offset is (N + 1) * page_size (spec.md §3/§4.3/§6;
        // upstream libesedb computes the same `(page_number + 1) *
        // page_size`).
        let offset = (page_number as u64 + 1) * page_size;

        self.file.seek(SeekFrom::Start(offset)).map_err(|e| {
            EdbError::io(
                IoErrorKind::SeekFailed,
                format!("cannot seek to page {page_number}: {e}"),
            )
        })?;

        let mut buf = vec![0u8; page_size as usize];
        self.file.read_exact(&mut buf).map_err(|e| {
            EdbError::io(
                IoErrorKind::ReadFailed,
                format!("cannot read page {page_number}: {e}"),
            )
        })?;

        if self.options.verify_checksums {
            let result = checksum::validate(
                &buf,
                page_number,
                self.header.format_version,
                self.header.format_revision,
            );
            if !result.valid {
                return Err(EdbError::input(
                    InputErrorKind::ChecksumMismatch,
                    format!("checksum mismatch on page {page_number}"),
                ));
            }
        }

        let page = Page::parse(buf, page_size as u32)?;
        Ok(Rc::new(page))
    }
}

impl PageSource for EsedbFile {
    fn load_page(&mut self, page_number: u32) -> Result<Rc<Page>, EdbError> {
        if let Some(page) = self.page_cache.get(&page_number) {
            return Ok(page.clone());
        }
        let page = self.read_page_from_disk(page_number)?;
        self.page_cache.put(page_number, page.clone());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn build_header(page_size: u32) -> Vec<u8> {
        let mut header = vec![0u8; FILE_HEADER_SIZE];
        LittleEndian::write_u32(&mut header[4..8], crate::edb::constants::FILE_SIGNATURE);
        LittleEndian::write_u32(&mut header[8..12], 0x620);
        LittleEndian::write_u32(&mut header[236..240], page_size);
        LittleEndian::write_u32(&mut header[240..244], 17);
        header
    }

    #[test]
    fn test_header_parse_rejects_bad_signature() {
        let mut header = build_header(4096);
        LittleEndian::write_u32(&mut header[4..8], 0);
        let err = FileHeader::parse(&header);
        assert!(err.is_err());
    }

    #[test]
    fn test_header_parse_reads_page_size() {
        let header = build_header(8192);
        let parsed = FileHeader::parse(&header).unwrap();
        assert_eq!(parsed.page_size, 8192);
        assert_eq!(parsed.format_version, 0x620);
    }

    #[test]
    fn test_open_reads_header_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&build_header(4096)).unwrap();
        file.flush().unwrap();

        let opened = EsedbFile::open(file.path()).unwrap();
        assert_eq!(opened.page_size(), 4096);
    }
}
