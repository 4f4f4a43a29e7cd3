//! Extensible Storage Engine (ESE/EDB) binary format parsing.
//!
//! This module contains types and functions for reading the on-disk
//! structures used by the Extensible Storage Engine: the paginated
//! B+Tree database format used by Exchange, Windows Search, SRUM,
//! WebCache, and Active Directory.
//!
//! Start with [`file::EsedbFile`] to open a file, then
//! [`catalog::Catalog`] to enumerate tables and [`pagetree::PageTreeWalker`]
//! to walk a table's data.

pub mod block_tree;
pub mod cache;
pub mod catalog;
pub mod checksum;
pub mod column;
pub mod compression;
pub mod constants;
pub mod error;
pub mod file;
pub mod key;
pub mod longvalue;
pub mod page;
pub mod pagetree;
pub mod record;

pub use error::EdbError;
pub use file::{EsedbFile, FileHeader, OpenOptions};
