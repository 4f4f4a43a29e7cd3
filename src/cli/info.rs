use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::cli::wprintln;
use crate::edb::file::{EsedbFile, OpenOptions};
use crate::EdbError;

/// Options for the `esedb info` subcommand.
pub struct InfoOptions {
    /// Path to the EDB file.
    pub file: String,
    /// Emit output as JSON.
    pub json: bool,
    /// Skip checksum validation while reading pages.
    pub no_checksum: bool,
}

#[derive(Serialize)]
struct FileInfoJson {
    file: String,
    signature: String,
    format_version: u32,
    format_revision: u32,
    file_type: u32,
    page_size: u32,
    database_time: u64,
    database_state: u32,
    database_state_name: String,
    codepage: u16,
    database_root_page: u32,
    catalog_root_page: u32,
}

/// Human-readable name for the `database_state` field (`JET_dbstate`).
fn database_state_name(state: u32) -> &'static str {
    match state {
        1 => "just created",
        2 => "dirty shutdown",
        3 => "clean shutdown",
        4 => "being converted",
        5 => "force detach",
        _ => "unknown",
    }
}

/// Print the file header and database state of an EDB file.
///
/// Opens the file, parses its 668-byte header (page 0), and reports the
/// signature, format version/revision, page size, database time, database
/// state, and codepage, along with the fixed database-root and
/// catalog-root page numbers used by every page-tree walk over this file.
pub fn execute(opts: &InfoOptions, writer: &mut dyn Write) -> Result<(), EdbError> {
    let options = OpenOptions {
        verify_checksums: !opts.no_checksum,
        ..OpenOptions::default()
    };
    let file = EsedbFile::open_with_options(&opts.file, options)?;
    let header = file.header();

    if opts.json {
        let info = FileInfoJson {
            file: opts.file.clone(),
            signature: format!("0x{:08x}", header.signature),
            format_version: header.format_version,
            format_revision: header.format_revision,
            file_type: header.file_type,
            page_size: header.page_size,
            database_time: header.database_time,
            database_state: header.database_state,
            database_state_name: database_state_name(header.database_state).to_string(),
            codepage: header.codepage,
            database_root_page: file.database_root(),
            catalog_root_page: file.catalog_root(),
        };
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| EdbError::argument(crate::edb::error::ArgumentErrorKind::Generic, e.to_string()))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    wprintln!(writer, "{}", opts.file.bold())?;
    wprintln!(writer, "  Signature:        0x{:08x}", header.signature)?;
    wprintln!(writer, "  Format version:   0x{:x}", header.format_version)?;
    wprintln!(writer, "  Format revision:  {}", header.format_revision)?;
    wprintln!(writer, "  File type:        {}", header.file_type)?;
    wprintln!(writer, "  Page size:        {}", header.page_size)?;
    wprintln!(writer, "  Database time:    {}", header.database_time)?;
    wprintln!(
        writer,
        "  Database state:   {} ({})",
        header.database_state,
        database_state_name(header.database_state)
    )?;
    wprintln!(writer, "  Codepage:         {}", header.codepage)?;
    wprintln!(writer, "  Database root:    page {}", file.database_root())?;
    wprintln!(writer, "  Catalog root:     page {}", file.catalog_root())?;

    Ok(())
}
