use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{open_catalog, wprintln};
use crate::edb::constants::{column_flags, column_type};
use crate::edb::error::{EdbError, RuntimeErrorKind};

/// Options for the `esedb columns` subcommand.
pub struct ColumnsOptions {
    /// Path to the EDB file.
    pub file: String,
    /// Table name to list columns for.
    pub table: String,
    /// Ignore template-table column inheritance when resolving the catalog.
    pub ignore_template_table: bool,
    /// Emit output as JSON.
    pub json: bool,
}

#[derive(Serialize)]
struct ColumnJson {
    identifier: u32,
    name: String,
    column_type: u32,
    column_type_name: String,
    fixed: bool,
    tagged: bool,
    not_null: bool,
    multi_valued: bool,
    compressed: bool,
}

/// `JET_coltyp` code to a human-readable name.
fn column_type_name(coltyp: u32) -> &'static str {
    match coltyp {
        column_type::NIL => "Nil",
        column_type::BOOLEAN => "Boolean",
        column_type::UNSIGNED_BYTE => "UnsignedByte",
        column_type::SHORT => "Short",
        column_type::LONG => "Long",
        column_type::CURRENCY => "Currency",
        column_type::IEEE_SINGLE => "IEEESingle",
        column_type::IEEE_DOUBLE => "IEEEDouble",
        column_type::DATE_TIME => "DateTime",
        column_type::BINARY => "Binary",
        column_type::TEXT => "Text",
        column_type::LONG_BINARY => "LongBinary",
        column_type::LONG_TEXT => "LongText",
        column_type::SUPER_LONG_VALUE => "SuperLong",
        column_type::UNSIGNED_LONG => "UnsignedLong",
        column_type::LONG_LONG => "LongLong",
        column_type::GUID => "Guid",
        column_type::UNSIGNED_SHORT => "UnsignedShort",
        _ => "Unknown",
    }
}

/// List a table's columns with their type and flags.
///
/// Looks the named table up in the catalog and prints each column's
/// identifier, name, `JET_coltyp` name, and the fixed/tagged/not-null/
/// multi-valued/compressed flags relevant to how [`crate::edb::record`]
/// decodes it.
pub fn execute(opts: &ColumnsOptions, writer: &mut dyn Write) -> Result<(), EdbError> {
    let (_file, catalog) = open_catalog(&opts.file, opts.ignore_template_table)?;

    let table = catalog.table(&opts.table).ok_or_else(|| {
        EdbError::runtime(
            RuntimeErrorKind::ValueMissing,
            format!("no such table: {}", opts.table),
        )
    })?;

    if opts.json {
        let columns: Vec<ColumnJson> = table
            .columns
            .iter()
            .map(|c| ColumnJson {
                identifier: c.identifier,
                name: c.name.clone(),
                column_type: c.column_type,
                column_type_name: column_type_name(c.column_type).to_string(),
                fixed: c.flags & column_flags::FIXED != 0,
                tagged: c.flags & column_flags::TAGGED != 0,
                not_null: c.flags & column_flags::NOT_NULL != 0,
                multi_valued: c.flags & column_flags::MULTI_VALUED != 0,
                compressed: c.flags & column_flags::COMPRESSED != 0,
            })
            .collect();
        let json = serde_json::to_string_pretty(&columns)
            .map_err(|e| EdbError::argument(crate::edb::error::ArgumentErrorKind::Generic, e.to_string()))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    wprintln!(
        writer,
        "{}",
        format!("{} ({} columns)", table.name, table.columns.len()).bold()
    )?;
    for column in &table.columns {
        let mut flags = Vec::new();
        if column.flags & column_flags::FIXED != 0 {
            flags.push("fixed");
        }
        if column.flags & column_flags::TAGGED != 0 {
            flags.push("tagged");
        }
        if column.flags & column_flags::NOT_NULL != 0 {
            flags.push("not-null");
        }
        if column.flags & column_flags::MULTI_VALUED != 0 {
            flags.push("multi-valued");
        }
        if column.flags & column_flags::COMPRESSED != 0 {
            flags.push("compressed");
        }
        wprintln!(
            writer,
            "  {:<4} {:<32} {:<14} {}",
            column.identifier,
            column.name,
            column_type_name(column.column_type),
            flags.join(",")
        )?;
    }

    Ok(())
}
