use std::io::Write;

use serde::Serialize;
use serde_json::Value as Json;

use crate::cli::{open_catalog, wprintln};
use crate::edb::column::{self, Value};
use crate::edb::compression;
use crate::edb::constants::{column_flags, page_flags};
use crate::edb::error::{EdbError, RuntimeErrorKind};
use crate::edb::key::CompatibilityFlags;
use crate::edb::longvalue;
use crate::edb::pagetree::PageTreeWalker;
use crate::edb::record::decode_record;

/// Options for the `esedb dump` subcommand.
pub struct DumpOptions {
    /// Path to the EDB file.
    pub file: String,
    /// Table name to dump records from.
    pub table: String,
    /// Maximum number of records to dump.
    pub limit: Option<usize>,
    /// Ignore template-table column inheritance when resolving the catalog.
    pub ignore_template_table: bool,
    /// Emit one JSON object per record instead of a text table.
    pub json: bool,
}

#[derive(Serialize)]
struct RecordJson {
    #[serde(flatten)]
    columns: serde_json::Map<String, Json>,
}

/// Dump a table's records as JSON or a text table.
///
/// Looks the named table up in the catalog, walks its data page tree
/// (rooted at the table's FDP object identifier), and decodes each leaf
/// value into one record per [`crate::edb::record::decode_record`]. Each
/// column's raw bytes are decompressed first if the column is flagged
/// `COMPRESSED`, then decoded with [`crate::edb::column::decode_value`].
/// `SUPER_LONG_VALUE` columns (a long-value identifier rather than inline
/// data) are resolved against the table's long-value tree, when it has
/// one, and rendered as a hex string.
pub fn execute(opts: &DumpOptions, writer: &mut dyn Write) -> Result<(), EdbError> {
    let (mut file, catalog) = open_catalog(&opts.file, opts.ignore_template_table)?;

    let table = catalog.table(&opts.table).ok_or_else(|| {
        EdbError::runtime(
            RuntimeErrorKind::ValueMissing,
            format!("no such table: {}", opts.table),
        )
    })?;
    let columns = table.columns.clone();
    let long_value_root = table.long_value_tree_root;

    let leaves = {
        let mut walker = PageTreeWalker::new(&mut file, CompatibilityFlags::NONE);
        walker.collect_all(table.data_tree_root)?
    };

    let limit = opts.limit.unwrap_or(leaves.len());
    let mut rows: Vec<serde_json::Map<String, Json>> = Vec::new();

    for leaf in leaves.iter().take(limit) {
        let new_record_format = leaf.page_flags & page_flags::IS_NEW_RECORD_FORMAT != 0;
        let record = decode_record(&leaf.data, &columns, new_record_format)?;
        let mut row = serde_json::Map::with_capacity(columns.len());
        for column in &columns {
            let rendered = if let Some(long_value_ref) = record.long_value(column) {
                match long_value_root {
                    Some(root) => {
                        let resolved = longvalue::resolve(&mut file, root, long_value_ref.id)?;
                        let decoded = decode_column_bytes(column, &resolved)?;
                        render_value(&decoded, &mut file, long_value_root)?
                    }
                    None => Json::String(format!("long-value-id:{}", long_value_ref.id)),
                }
            } else if let Some(parts) = record.multi_value(column) {
                let mut values = Vec::with_capacity(parts.len());
                for raw in parts {
                    let decoded = decode_column_bytes(column, raw)?;
                    values.push(render_value(&decoded, &mut file, long_value_root)?);
                }
                Json::Array(values)
            } else {
                match record.get(column) {
                    None => Json::Null,
                    Some(raw) => {
                        let decoded = decode_column_bytes(column, raw)?;
                        render_value(&decoded, &mut file, long_value_root)?
                    }
                }
            };
            row.insert(column.name.clone(), rendered);
        }
        rows.push(row);
    }

    if opts.json {
        for row in &rows {
            let json = serde_json::to_string(row)
                .map_err(|e| EdbError::argument(crate::edb::error::ArgumentErrorKind::Generic, e.to_string()))?;
            wprintln!(writer, "{}", json)?;
        }
        return Ok(());
    }

    wprintln!(writer, "{}", columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join("\t"))?;
    for row in &rows {
        let line: Vec<String> = columns
            .iter()
            .map(|c| json_to_cell(row.get(&c.name).unwrap_or(&Json::Null)))
            .collect();
        wprintln!(writer, "{}", line.join("\t"))?;
    }

    Ok(())
}

/// Decompress `raw` when `column` is flagged `COMPRESSED`, then decode it
/// as `column`'s type.
fn decode_column_bytes(column: &crate::edb::catalog::ColumnDef, raw: &[u8]) -> Result<Value, EdbError> {
    let decompressed;
    let bytes = if column.flags & column_flags::COMPRESSED != 0 {
        decompressed = compression::decompress(raw).unwrap_or_else(|_| raw.to_vec());
        decompressed.as_slice()
    } else {
        raw
    };
    column::decode_value(bytes, column.column_type)
}

fn json_to_cell(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a decoded [`Value`] as JSON, resolving `SuperLargeValue`
/// long-value identifiers against the table's long-value tree when one is
/// available.
fn render_value(
    value: &Value,
    file: &mut crate::edb::file::EsedbFile,
    long_value_root: Option<u32>,
) -> Result<Json, EdbError> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::UInt8(n) => Json::from(*n),
        Value::UInt16(n) => Json::from(*n),
        Value::UInt32(n) => Json::from(*n),
        Value::Int16(n) => Json::from(*n),
        Value::Int32(n) => Json::from(*n),
        Value::Int64(n) => Json::from(*n),
        Value::Currency(n) => Json::from(*n),
        Value::Float32(f) => serde_json::Number::from_f64(*f as f64)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Float64(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::DateTime(days) => Json::String(Value::datetime_to_rfc3339(*days)),
        Value::Binary(b) | Value::LargeBinary(b) => Json::String(hex_string(b)),
        Value::Text(s) | Value::LargeText(s) => Json::String(s.clone()),
        Value::Guid(g) => Json::String(hex_string(g)),
        Value::SuperLargeValue(id) => match long_value_root {
            Some(root) => {
                let resolved = longvalue::resolve(file, root, *id)?;
                Json::String(hex_string(&resolved))
            }
            None => Json::String(format!("long-value-id:{id}")),
        },
    })
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
