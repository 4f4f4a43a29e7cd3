use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{open_catalog, wprintln};
use crate::EdbError;

/// Options for the `esedb tables` subcommand.
pub struct TablesOptions {
    /// Path to the EDB file.
    pub file: String,
    /// Ignore template-table column inheritance when resolving the catalog.
    pub ignore_template_table: bool,
    /// Emit output as JSON.
    pub json: bool,
}

#[derive(Serialize)]
struct TableSummaryJson {
    name: String,
    identifier: u32,
    column_count: usize,
    index_count: usize,
}

/// List every table found while walking the catalog page tree.
///
/// Opens the file, walks the catalog root (fixed page 4), and resolves
/// template-table inheritance, then prints each table's name, object
/// identifier, and column/index counts.
pub fn execute(opts: &TablesOptions, writer: &mut dyn Write) -> Result<(), EdbError> {
    let (_file, catalog) = open_catalog(&opts.file, opts.ignore_template_table)?;

    let mut tables: Vec<_> = catalog.tables().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));

    if opts.json {
        let summaries: Vec<TableSummaryJson> = tables
            .iter()
            .map(|t| TableSummaryJson {
                name: t.name.clone(),
                identifier: t.identifier,
                column_count: t.columns.len(),
                index_count: t.indexes.len(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&summaries)
            .map_err(|e| EdbError::argument(crate::edb::error::ArgumentErrorKind::Generic, e.to_string()))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    wprintln!(writer, "{}", format!("{} tables", tables.len()).bold())?;
    for table in &tables {
        wprintln!(
            writer,
            "  {:<32} id={:<8} columns={:<4} indexes={}",
            table.name,
            table.identifier,
            table.columns.len(),
            table.indexes.len()
        )?;
    }

    Ok(())
}
