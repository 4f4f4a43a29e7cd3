//! B+Tree descent over a page tree.
//!
//! A page tree is identified by its root page number (database=1,
//! catalog=4, or a table/index's own root as recorded in the catalog).
//! [`PageTreeWalker`] descends from the root, following BRANCH tags to
//! child pages and collecting LEAF tags in key order, using a
//! [`BlockTree`] to detect a page tree that cycles back on itself.

use crate::edb::block_tree::{BlockTree, VisitOutcome};
use crate::edb::constants::key_type;
use crate::edb::error::{EdbError, InputErrorKind, RuntimeErrorKind};
use crate::edb::key::{CompatibilityFlags, PageTreeKey, PageTreeValue};
use crate::edb::page::Page;

/// A single leaf value found while walking a page tree: the key used to
/// order it plus its raw payload bytes.
#[derive(Debug, Clone)]
pub struct LeafValue {
    pub key: Vec<u8>,
    pub data: Vec<u8>,
    pub leaf_page_number: u32,
    /// The originating leaf page's header flags, so callers can tell
    /// whether its records use NEW_RECORD_FORMAT tagged-value framing
    /// (`crate::edb::constants::page_flags::IS_NEW_RECORD_FORMAT`).
    pub page_flags: u32,
}

/// Loads pages by number. Implemented by the file's pager; kept abstract
/// here so the walker can be unit tested against an in-memory map.
pub trait PageSource {
    fn load_page(&mut self, page_number: u32) -> Result<std::rc::Rc<Page>, EdbError>;
}

pub struct PageTreeWalker<'a, S: PageSource> {
    source: &'a mut S,
    compat: CompatibilityFlags,
}

impl<'a, S: PageSource> PageTreeWalker<'a, S> {
    pub fn new(source: &'a mut S, compat: CompatibilityFlags) -> Self {
        PageTreeWalker { source, compat }
    }

    /// Walk the whole tree rooted at `root_page_number`, returning every
    /// leaf value in key order.
    pub fn collect_all(&mut self, root_page_number: u32) -> Result<Vec<LeafValue>, EdbError> {
        let mut visited = BlockTree::new();
        let mut out = Vec::new();
        self.descend(root_page_number, &mut visited, &mut out)?;
        Ok(out)
    }

    fn descend(
        &mut self,
        page_number: u32,
        visited: &mut BlockTree,
        out: &mut Vec<LeafValue>,
    ) -> Result<(), EdbError> {
        if visited.visit(page_number as u64) == VisitOutcome::Existing {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                format!("page tree cycle detected at page {page_number}"),
            ));
        }

        let page = self.source.load_page(page_number)?;

        if page.header.is_leaf() {
            self.collect_leaf(&page, out)?;
            return Ok(());
        }

        if !page.header.is_parent() {
            return Err(EdbError::runtime(
                RuntimeErrorKind::ValueMissing,
                format!("page {page_number} is neither leaf nor parent"),
            ));
        }

        let mut previous_key: Vec<u8> = Vec::new();
        for tag in &page.tags {
            if tag.is_defunct {
                continue;
            }
            let raw = page.value_bytes(tag)?;
            let value = PageTreeValue::read(raw, tag.has_common_key_size);
            let full_key = value.full_key(&previous_key);
            previous_key = full_key;

            let child_page_number = parse_child_page_number(&value.data)?;
            self.descend(child_page_number, visited, out)?;
        }
        Ok(())
    }

    fn collect_leaf(&self, page: &Page, out: &mut Vec<LeafValue>) -> Result<(), EdbError> {
        let mut previous_key: Vec<u8> = Vec::new();
        for tag in &page.tags {
            if tag.is_defunct {
                continue;
            }
            let raw = page.value_bytes(tag)?;
            let value = PageTreeValue::read(raw, tag.has_common_key_size);
            let full_key = value.full_key(&previous_key);
            previous_key = full_key.clone();

            out.push(LeafValue {
                key: full_key,
                data: value.data,
                leaf_page_number: page.header.page_number_or_ecc_checksum,
                page_flags: page.header.flags,
            });
        }
        Ok(())
    }

    /// Find the single leaf value matching `search_key`, if any, using the
    /// compatibility flags configured on this walker.
    pub fn find(
        &mut self,
        root_page_number: u32,
        search_key: &PageTreeKey,
    ) -> Result<Option<LeafValue>, EdbError> {
        let mut visited = BlockTree::new();
        self.find_descend(root_page_number, search_key, &mut visited)
    }

    fn find_descend(
        &mut self,
        page_number: u32,
        search_key: &PageTreeKey,
        visited: &mut BlockTree,
    ) -> Result<Option<LeafValue>, EdbError> {
        if visited.visit(page_number as u64) == VisitOutcome::Existing {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                format!("page tree cycle detected at page {page_number}"),
            ));
        }
        let page = self.source.load_page(page_number)?;

        if page.header.is_leaf() {
            let mut previous_key: Vec<u8> = Vec::new();
            for tag in &page.tags {
                if tag.is_defunct {
                    continue;
                }
                let raw = page.value_bytes(tag)?;
                let value = PageTreeValue::read(raw, tag.has_common_key_size);
                let full_key = value.full_key(&previous_key);
                previous_key = full_key.clone();

                let candidate = PageTreeKey::new(key_type::LEAF, full_key.clone());
                if search_key.compare(&candidate, self.compat) == std::cmp::Ordering::Equal {
                    return Ok(Some(LeafValue {
                        key: full_key,
                        data: value.data,
                        leaf_page_number: page.header.page_number_or_ecc_checksum,
                        page_flags: page.header.flags,
                    }));
                }
            }
            return Ok(None);
        }

        let mut previous_key: Vec<u8> = Vec::new();
        let mut chosen_child: Option<u32> = None;
        for tag in &page.tags {
            if tag.is_defunct {
                continue;
            }
            let raw = page.value_bytes(tag)?;
            let value = PageTreeValue::read(raw, tag.has_common_key_size);
            let full_key = value.full_key(&previous_key);
            previous_key = full_key.clone();

            let branch_key = PageTreeKey::new(key_type::BRANCH, full_key);
            if search_key.compare(&branch_key, self.compat) != std::cmp::Ordering::Greater {
                chosen_child = Some(parse_child_page_number(&value.data)?);
                break;
            }
            chosen_child = Some(parse_child_page_number(&value.data)?);
        }

        match chosen_child {
            Some(child) => self.find_descend(child, search_key, visited),
            None => Ok(None),
        }
    }
}

fn parse_child_page_number(data: &[u8]) -> Result<u32, EdbError> {
    if data.len() < 4 {
        return Err(EdbError::input(
            InputErrorKind::InvalidData,
            "branch tag value too small to hold a child page number",
        ));
    }
    Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::rc::Rc;

    struct MapSource(HashMap<u32, Rc<Page>>);

    impl PageSource for MapSource {
        fn load_page(&mut self, page_number: u32) -> Result<Rc<Page>, EdbError> {
            self.0
                .get(&page_number)
                .cloned()
                .ok_or_else(|| EdbError::runtime(RuntimeErrorKind::ValueMissing, "no such page"))
        }
    }

    fn leaf_page(page_number: u32, entries: &[(&[u8], &[u8])]) -> Page {
        use byteorder::{ByteOrder, LittleEndian};
        use crate::edb::constants::{page_flags, PAGE_HEADER_SIZE};

        let mut data_region = Vec::new();
        let mut tag_bounds = Vec::new();
        for (key, value) in entries {
            let start = data_region.len();
            data_region.extend_from_slice(key);
            data_region.extend_from_slice(value);
            tag_bounds.push((start, key.len() + value.len()));
        }

        let mut page = vec![0u8; PAGE_HEADER_SIZE];
        page.extend_from_slice(&data_region);

        for (offset, size) in &tag_bounds {
            let mut tag = [0u8; 4];
            LittleEndian::write_u16(&mut tag[0..2], *offset as u16);
            LittleEndian::write_u16(&mut tag[2..4], *size as u16);
            page.extend_from_slice(&tag);
        }

        LittleEndian::write_u32(&mut page[4..8], page_number);
        LittleEndian::write_u16(&mut page[34..36], entries.len() as u16);
        LittleEndian::write_u32(&mut page[36..40], page_flags::IS_LEAF);

        Page::parse(page, 4096).unwrap()
    }

    #[test]
    fn test_collect_all_single_leaf() {
        let page = leaf_page(10, &[(&[1], &[0xAA]), (&[2], &[0xBB])]);
        let mut source = MapSource(HashMap::from([(10, Rc::new(page))]));
        let mut walker = PageTreeWalker::new(&mut source, CompatibilityFlags::NONE);
        let values = walker.collect_all(10).unwrap();
        assert_eq!(values.len(), 2);
    }
}
