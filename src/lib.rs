//! Extensible Storage Engine (ESE/EDB) database file reader.
//!
//! The `esedb-utils` crate (library name `edb`) provides Rust types and
//! functions for reading Extensible Storage Engine database files
//! (`.edb`), the paginated B+Tree storage format used by Microsoft
//! Exchange, Windows Search, SRUM, WebCache, and Active Directory. This
//! crate is read-only: it has no write, repair, or defragmentation path.
//!
//! # CLI Reference
//!
//! Install the `esedb` binary and use its subcommands to inspect EDB
//! files from the command line.
//!
//! ## Subcommands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | [`esedb info`](cli::app::Commands::Info) | Print the file header and database state |
//! | [`esedb tables`](cli::app::Commands::Tables) | List tables found in the catalog |
//! | [`esedb columns`](cli::app::Commands::Columns) | List a table's columns and types |
//! | [`esedb dump`](cli::app::Commands::Dump) | Dump a table's records as JSON or a text table |
//!
//! ## Global options
//!
//! All subcommands accept `--color <auto|always|never>` and `--output <file>`.
//! Most subcommands also accept `--json` for machine-readable output.
//!
//! See the [`cli`] module for full details.
//!
//! # Library API
//!
//! Add `edb` as a dependency to use the parsing library directly:
//!
//! ```toml
//! [dependencies]
//! edb = { package = "esedb-utils", version = "0.1" }
//! ```
//!
//! ## Quick example
//!
//! ```no_run
//! use edb::edb::file::EsedbFile;
//! use edb::edb::pagetree::PageTreeWalker;
//! use edb::edb::catalog::{Catalog, CatalogOptions};
//! use edb::edb::key::CompatibilityFlags;
//!
//! // Open a database file; the file header is parsed and validated up front.
//! let mut file = EsedbFile::open("database.edb").unwrap();
//!
//! // Walk the catalog page tree and build the table/column index.
//! let catalog_root = file.catalog_root();
//! let leaves = {
//!     let mut walker = PageTreeWalker::new(&mut file, CompatibilityFlags::NONE);
//!     walker.collect_all(catalog_root).unwrap()
//! };
//! let catalog = Catalog::build(&leaves, CatalogOptions::default()).unwrap();
//!
//! for table in catalog.tables() {
//!     println!("table {} ({} columns)", table.name, table.columns.len());
//! }
//! ```
//!
//! ## Key entry points
//!
//! | Type / Function | Purpose |
//! |-----------------|---------|
//! | [`edb::file::EsedbFile`] | Open `.edb` files, read pages through an LRU cache |
//! | [`edb::page::Page`] | Parsed page header, tag array, and value access |
//! | [`edb::pagetree::PageTreeWalker`] | Descend a page tree, collecting or finding leaf values |
//! | [`edb::catalog::Catalog`] | Tables, columns, and indexes, with template-table inheritance resolved |
//! | [`edb::record::decode_record`] | Split a leaf value into column slices |
//! | [`edb::column::decode_value`] | Decode one column's bytes into a typed [`edb::column::Value`] |
//! | [`edb::longvalue::resolve`] | Reassemble a long value from its segments |
//! | [`edb::checksum::validate`] | Validate a page's XOR or XOR+ECC checksum |
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`edb::file`] | File header parsing, page I/O, LRU page cache |
//! | [`edb::page`] | Page header, tag array, root-page extension |
//! | [`edb::checksum`] | Legacy XOR and current XOR+ECC checksum validation |
//! | [`edb::block_tree`] | Cycle/duplicate-visit detection during tree descent |
//! | [`edb::key`] | Page-tree key comparison and prefix-compressed value decode |
//! | [`edb::pagetree`] | B+Tree descent: collect-all and point lookups |
//! | [`edb::catalog`] | Table/column/index catalog, template-table inheritance |
//! | [`edb::column`] | Typed column value decoding |
//! | [`edb::record`] | Fixed/variable/tagged record region decoding |
//! | [`edb::longvalue`] | Long-value segment store access |
//! | [`edb::cache`] | Bounded LRU cache for decoded long-value segments |
//! | [`edb::compression`] | 7-bit ASCII and byte-stream column decompressors |
//! | [`edb::error`] | The `EdbError` taxonomy |
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | on | Builds the `esedb` binary and its `clap`/`colored`/`tracing-subscriber` dependencies. |

pub mod cli;
pub mod edb;
pub mod util;

pub use edb::EdbError;
