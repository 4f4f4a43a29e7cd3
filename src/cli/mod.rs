//! CLI subcommand implementations for the `esedb` binary.
//!
//! The `esedb` binary provides four subcommands for inspecting Extensible
//! Storage Engine database files. CLI argument parsing uses clap derive
//! macros, with the top-level [`app::Cli`] struct and [`app::Commands`] enum
//! defined in [`app`] and shared between `main.rs` and `build.rs` (for man
//! page generation) via `include!()`.
//!
//! Each subcommand module follows the same pattern: an `Options` struct
//! holding the parsed arguments and a `pub fn execute(opts, writer) ->
//! Result<(), EdbError>` entry point. The `writer: &mut dyn Write` parameter
//! allows output to be captured in tests or redirected to a file via the
//! global `--output` flag.
//!
//! # Subcommands
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `esedb info` | [`info`] | Print the file header and database state |
//! | `esedb tables` | [`tables`] | List tables found in the catalog |
//! | `esedb columns` | [`columns`] | List a table's columns and types |
//! | `esedb dump` | [`dump`] | Dump a table's records as JSON or a text table |
//!
//! # Common patterns
//!
//! - **`--json`** — Every subcommand supports structured JSON output via
//!   `#[derive(Serialize)]` structs and `serde_json`.
//! - **`--color`** (global) — Control colored terminal output (`auto`,
//!   `always`, `never`).
//! - **`--output` / `-o`** (global) — Redirect output to a file instead of
//!   stdout.
//!
//! These are read-only table scans over an already-open file; there is no
//! long-running operation here that would justify a progress bar.

pub mod app;
pub mod columns;
pub mod dump;
pub mod info;
pub mod tables;

/// Write a line to the given writer, converting io::Error to EdbError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::EdbError::from(e))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::EdbError::from(e))
    };
}

/// Write (without newline) to the given writer, converting io::Error to EdbError.
macro_rules! wprint {
    ($w:expr, $($arg:tt)*) => {
        write!($w, $($arg)*).map_err(|e| $crate::EdbError::from(e))
    };
}

pub(crate) use wprint;
pub(crate) use wprintln;

use crate::edb::catalog::{Catalog, CatalogOptions};
use crate::edb::file::EsedbFile;
use crate::edb::key::CompatibilityFlags;
use crate::edb::pagetree::PageTreeWalker;
use crate::EdbError;

/// Open `path` and build its catalog (the table/column/index index rooted
/// at the fixed catalog page). Shared by every subcommand that needs to
/// look up a table by name.
pub(crate) fn open_catalog(
    path: &str,
    ignore_template_table: bool,
) -> Result<(EsedbFile, Catalog), EdbError> {
    let mut file = EsedbFile::open(path)?;
    let catalog_root = file.catalog_root();
    let leaves = {
        let mut walker = PageTreeWalker::new(&mut file, CompatibilityFlags::NONE);
        walker.collect_all(catalog_root)?
    };
    let catalog = Catalog::build(
        &leaves,
        CatalogOptions {
            ignore_template_table,
        },
    )?;
    Ok((file, catalog))
}
