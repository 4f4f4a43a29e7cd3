//! Benchmarks for the hot paths of EDB parsing: checksum validation,
//! column decompression, cycle detection, and page-tree descent.

use std::collections::HashMap;
use std::rc::Rc;

use byteorder::{ByteOrder, LittleEndian};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use edb::edb::block_tree::BlockTree;
use edb::edb::checksum;
use edb::edb::compression;
use edb::edb::constants::*;
use edb::edb::key::CompatibilityFlags;
use edb::edb::page::Page;
use edb::edb::pagetree::{PageSource, PageTreeWalker};

const FORMAT_VERSION: u32 = 0x600;
const FORMAT_REVISION: u32 = 0;

fn bench_checksum_validate(c: &mut Criterion) {
    let mut page = vec![0xABu8; 16384];
    LittleEndian::write_u32(&mut page[4..8], 7);
    let probe = checksum::validate(&page, 7, FORMAT_VERSION, FORMAT_REVISION);
    LittleEndian::write_u32(&mut page[0..4], probe.calculated_xor);

    c.bench_function("checksum::validate 16 KiB page", |b| {
        b.iter(|| checksum::validate(black_box(&page), 7, FORMAT_VERSION, FORMAT_REVISION))
    });
}

fn bench_decompress_7bit_ascii(c: &mut Criterion) {
    // A run of printable ASCII, each masked to clear the top bit so every
    // byte already matches what the ascii7 decoder would emit.
    let mut compressed = vec![0x00u8];
    compressed.extend((0u8..120).map(|i| (b'a' + (i % 26)) & 0x7f));

    c.bench_function("compression::decompress 7-bit ASCII (120 bytes)", |b| {
        b.iter(|| compression::decompress(black_box(&compressed)).unwrap())
    });
}

fn bench_decompress_byte_stream(c: &mut Criterion) {
    let mut compressed = vec![0x18u8];
    for run in 0u8..20 {
        compressed.push(8); // run length
        compressed.push(run); // high byte
        compressed.extend(std::iter::repeat(b'x').take(8));
    }

    c.bench_function("compression::decompress byte-stream (20 runs)", |b| {
        b.iter(|| compression::decompress(black_box(&compressed)).unwrap())
    });
}

fn bench_block_tree_visit(c: &mut Criterion) {
    c.bench_function("BlockTree::visit 10k sequential pages", |b| {
        b.iter(|| {
            let mut tree = BlockTree::new();
            for page_number in 0u64..10_000 {
                black_box(tree.visit(page_number));
            }
        })
    });
}

/// Assemble a leaf page with tagged (common-key-size-prefixed) entries, the
/// same convention the scenario integration tests use.
fn assemble_leaf(page_size: usize, page_number: u32, entries: &[(Vec<u8>, Vec<u8>)]) -> Page {
    let tag_size = if (page_size as u32) < LARGE_PAGE_TAG_THRESHOLD {
        PAGE_TAG_SIZE_SMALL
    } else {
        PAGE_TAG_SIZE_LARGE
    };

    let mut buf = vec![0u8; page_size];
    LittleEndian::write_u32(&mut buf[4..8], page_number);
    LittleEndian::write_u16(&mut buf[34..36], entries.len() as u16);
    LittleEndian::write_u32(&mut buf[36..40], page_flags::IS_LEAF);

    let mut region = Vec::new();
    let mut spans = Vec::new();
    for (key, data) in entries {
        let start = region.len();
        region.extend_from_slice(&0u16.to_le_bytes());
        region.extend_from_slice(&(key.len() as u16).to_le_bytes());
        region.extend_from_slice(key);
        region.extend_from_slice(data);
        spans.push((start, region.len() - start));
    }
    buf[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + region.len()].copy_from_slice(&region);

    for (i, (offset, size)) in spans.iter().enumerate() {
        let tag_offset = page_size - (i + 1) * tag_size;
        let raw_size = (*size as u16) | tag_flags::HAS_COMMON_KEY_SIZE;
        if tag_size == PAGE_TAG_SIZE_SMALL {
            LittleEndian::write_u16(&mut buf[tag_offset..tag_offset + 2], *offset as u16);
            LittleEndian::write_u16(&mut buf[tag_offset + 2..tag_offset + 4], raw_size);
        } else {
            LittleEndian::write_u32(&mut buf[tag_offset..tag_offset + 4], *offset as u32);
            LittleEndian::write_u32(&mut buf[tag_offset + 4..tag_offset + 8], raw_size as u32);
        }
    }

    Page::parse(buf, page_size as u32).unwrap()
}

struct MapSource(HashMap<u32, Rc<Page>>);

impl PageSource for MapSource {
    fn load_page(&mut self, page_number: u32) -> Result<Rc<Page>, edb::EdbError> {
        self.0.get(&page_number).cloned().ok_or_else(|| {
            edb::EdbError::runtime(edb::edb::error::RuntimeErrorKind::ValueMissing, "missing")
        })
    }
}

/// Build a 2-level tree: one branch root fanning out to `leaf_count` leaves
/// of `rows_per_leaf` entries each.
fn build_tree(leaf_count: u32, rows_per_leaf: u32) -> (MapSource, u32) {
    const PAGE_SIZE: usize = 4096;
    let mut pages = HashMap::new();

    let mut branch_entries = Vec::new();
    for leaf_index in 0..leaf_count {
        let leaf_page_number = 100 + leaf_index;
        let entries: Vec<(Vec<u8>, Vec<u8>)> = (0..rows_per_leaf)
            .map(|row| {
                let key = (leaf_index * rows_per_leaf + row).to_be_bytes().to_vec();
                (key, vec![0xAB; 16])
            })
            .collect();
        let leaf = assemble_leaf(PAGE_SIZE, leaf_page_number, &entries);
        pages.insert(leaf_page_number, Rc::new(leaf));

        let branch_key = (leaf_index * rows_per_leaf + rows_per_leaf - 1)
            .to_be_bytes()
            .to_vec();
        branch_entries.push((branch_key, leaf_page_number.to_le_bytes().to_vec()));
    }

    let mut branch_buf = vec![0u8; PAGE_SIZE];
    LittleEndian::write_u32(&mut branch_buf[4..8], 1);
    LittleEndian::write_u16(&mut branch_buf[34..36], branch_entries.len() as u16);
    LittleEndian::write_u32(&mut branch_buf[36..40], page_flags::IS_PARENT);

    let mut region = Vec::new();
    let mut spans = Vec::new();
    for (key, data) in &branch_entries {
        let start = region.len();
        region.extend_from_slice(&0u16.to_le_bytes());
        region.extend_from_slice(&(key.len() as u16).to_le_bytes());
        region.extend_from_slice(key);
        region.extend_from_slice(data);
        spans.push((start, region.len() - start));
    }
    branch_buf[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + region.len()].copy_from_slice(&region);
    for (i, (offset, size)) in spans.iter().enumerate() {
        let tag_offset = PAGE_SIZE - (i + 1) * PAGE_TAG_SIZE_SMALL;
        let raw_size = (*size as u16) | tag_flags::HAS_COMMON_KEY_SIZE;
        LittleEndian::write_u16(&mut branch_buf[tag_offset..tag_offset + 2], *offset as u16);
        LittleEndian::write_u16(&mut branch_buf[tag_offset + 2..tag_offset + 4], raw_size);
    }
    let branch = Page::parse(branch_buf, PAGE_SIZE as u32).unwrap();
    pages.insert(1, Rc::new(branch));

    (MapSource(pages), 1)
}

fn bench_pagetree_collect_all(c: &mut Criterion) {
    let (source, root) = build_tree(50, 40);

    c.bench_function("PageTreeWalker::collect_all 50 leaves x 40 rows", |b| {
        b.iter_batched(
            || MapSource(
                source
                    .0
                    .iter()
                    .map(|(k, v)| (*k, v.clone()))
                    .collect::<HashMap<_, _>>(),
            ),
            |mut source| {
                let mut walker = PageTreeWalker::new(&mut source, CompatibilityFlags::NONE);
                black_box(walker.collect_all(root).unwrap());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_checksum_validate,
    bench_decompress_7bit_ascii,
    bench_decompress_byte_stream,
    bench_block_tree_visit,
    bench_pagetree_collect_all,
);
criterion_main!(benches);
