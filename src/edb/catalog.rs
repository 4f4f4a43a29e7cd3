//! The catalog: a specialized page tree, rooted at the fixed catalog page
//! number, whose leaf values describe every table, column, index,
//! long-value column, and callback in the database.
//!
//! Catalog entries are grouped by `father_data_page_id`: a table entry's
//! own `father_data_page_id` is its own object id, while its columns and
//! indexes carry the table's object id as their `father_data_page_id`.
//! Building a [`Table`] means collecting all entries that share a table
//! entry's object id.
//!
//! Template tables add one further step (A5): a table whose catalog entry
//! names a `template_table` has its column list extended with the named
//! template's columns at construction time, unless the caller passes
//! [`CatalogOptions::ignore_template_table`].

use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};

use crate::edb::constants::catalog_type;
use crate::edb::error::{EdbError, InputErrorKind};
use crate::edb::pagetree::LeafValue;

/// One raw entry decoded from a catalog leaf value.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub father_data_page_id: u32,
    pub entry_type: u16,
    pub identifier: u32,
    pub name: String,
    pub column_type: Option<u32>,
    pub column_flags: Option<u32>,
    pub space_usage: Option<u32>,
    pub template_table: Option<String>,
}

impl CatalogEntry {
    /// Decode a catalog leaf value's data payload.
    ///
    /// Layout (little-endian, after the leaf key is stripped off):
    /// `father_data_page_id: u32, entry_type: u16, identifier: u32,
    /// column_type: u32, space_usage: u32, column_flags: u32,
    /// name_length: u16, name: [u8; name_length],
    /// template_table_length: u16, template_table: [u8; ...]`
    pub fn decode(data: &[u8]) -> Result<Self, EdbError> {
        if data.len() < 22 {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                "catalog entry too small",
            ));
        }
        let father_data_page_id = LittleEndian::read_u32(&data[0..4]);
        let entry_type = LittleEndian::read_u16(&data[4..6]);
        let identifier = LittleEndian::read_u32(&data[6..10]);
        let column_type_raw = LittleEndian::read_u32(&data[10..14]);
        let space_usage = LittleEndian::read_u32(&data[14..18]);
        let column_flags = LittleEndian::read_u32(&data[18..22]);

        let mut offset = 22;
        let name = read_prefixed_string(data, &mut offset)?;
        let template_table = if offset < data.len() {
            let t = read_prefixed_string(data, &mut offset)?;
            if t.is_empty() {
                None
            } else {
                Some(t)
            }
        } else {
            None
        };

        let (column_type, column_flags) = if entry_type == catalog_type::COLUMN {
            (Some(column_type_raw), Some(column_flags))
        } else {
            (None, None)
        };

        Ok(CatalogEntry {
            father_data_page_id,
            entry_type,
            identifier,
            name,
            column_type,
            column_flags,
            space_usage: Some(space_usage),
            template_table,
        })
    }
}

fn read_prefixed_string(data: &[u8], offset: &mut usize) -> Result<String, EdbError> {
    if *offset + 2 > data.len() {
        return Ok(String::new());
    }
    let len = LittleEndian::read_u16(&data[*offset..*offset + 2]) as usize;
    *offset += 2;
    if *offset + len > data.len() {
        return Err(EdbError::input(
            InputErrorKind::InvalidData,
            "catalog entry name length out of bounds",
        ));
    }
    let s = String::from_utf8_lossy(&data[*offset..*offset + len]).into_owned();
    *offset += len;
    Ok(s)
}

/// A column definition as exposed to callers.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub identifier: u32,
    pub name: String,
    pub column_type: u32,
    pub flags: u32,
}

/// An index definition as exposed to callers.
#[derive(Debug, Clone)]
pub struct IndexDef {
    pub identifier: u32,
    pub name: String,
}

/// A fully resolved table: its own entry plus columns/indexes, with
/// template-table inheritance already applied.
#[derive(Debug, Clone)]
pub struct Table {
    pub identifier: u32,
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
    /// Root page of this table's own data page tree. A table's FDP
    /// (father data page) object identifier doubles as the page number
    /// that roots its data tree, so this is the same value as
    /// `identifier`.
    pub data_tree_root: u32,
    /// Root page of this table's long-value page tree, if it has one
    /// (a LONG_VALUE catalog entry among its children).
    pub long_value_tree_root: Option<u32>,
}

/// Options controlling catalog resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogOptions {
    pub ignore_template_table: bool,
}

/// The parsed catalog: every table in the database, indexed by name.
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// Build a catalog from the catalog page tree's leaf values.
    pub fn build(leaves: &[LeafValue], options: CatalogOptions) -> Result<Self, EdbError> {
        let mut entries: Vec<CatalogEntry> = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            entries.push(CatalogEntry::decode(&leaf.data)?);
        }

        let mut by_father: HashMap<u32, Vec<&CatalogEntry>> = HashMap::new();
        for entry in &entries {
            by_father.entry(entry.father_data_page_id).or_default().push(entry);
        }

        let table_entries: Vec<&CatalogEntry> = entries
            .iter()
            .filter(|e| e.entry_type == catalog_type::TABLE)
            .collect();

        let mut raw_tables: HashMap<u32, Table> = HashMap::new();
        for table_entry in &table_entries {
            let object_id = table_entry.identifier;
            let children = by_father.get(&object_id).cloned().unwrap_or_default();

            let columns = children
                .iter()
                .filter(|e| e.entry_type == catalog_type::COLUMN)
                .map(|e| ColumnDef {
                    identifier: e.identifier,
                    name: e.name.clone(),
                    column_type: e.column_type.unwrap_or(0),
                    flags: e.column_flags.unwrap_or(0),
                })
                .collect::<Vec<_>>();

            let indexes = children
                .iter()
                .filter(|e| e.entry_type == catalog_type::INDEX)
                .map(|e| IndexDef {
                    identifier: e.identifier,
                    name: e.name.clone(),
                })
                .collect::<Vec<_>>();

            let long_value_tree_root = children
                .iter()
                .find(|e| e.entry_type == catalog_type::LONG_VALUE)
                .map(|e| e.identifier);

            raw_tables.insert(
                object_id,
                Table {
                    identifier: object_id,
                    name: table_entry.name.clone(),
                    columns,
                    indexes,
                    data_tree_root: object_id,
                    long_value_tree_root,
                },
            );
        }

        let mut tables = HashMap::with_capacity(raw_tables.len());
        for table_entry in &table_entries {
            let object_id = table_entry.identifier;
            let mut table = raw_tables
                .get(&object_id)
                .cloned()
                .expect("table was just inserted by object id");

            if !options.ignore_template_table {
                if let Some(template_name) = &table_entry.template_table {
                    if let Some(template_entry) = table_entries
                        .iter()
                        .find(|e| &e.name == template_name)
                    {
                        if let Some(template) = raw_tables.get(&template_entry.identifier) {
                            splice_template_columns(&mut table, template);
                        }
                    }
                }
            }

            tables.insert(table.name.clone(), table);
        }

        Ok(Catalog { tables })
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}

/// Splice the template's columns in ahead of the table's own columns,
/// skipping any name already defined locally (a table may override a
/// subset of its template's columns).
fn splice_template_columns(table: &mut Table, template: &Table) {
    let local_names: std::collections::HashSet<&str> =
        table.columns.iter().map(|c| c.name.as_str()).collect();
    let mut inherited: Vec<ColumnDef> = template
        .columns
        .iter()
        .filter(|c| !local_names.contains(c.name.as_str()))
        .cloned()
        .collect();
    inherited.extend(std::mem::take(&mut table.columns));
    table.columns = inherited;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_bytes(
        father: u32,
        entry_type: u16,
        id: u32,
        column_type: u32,
        name: &str,
        template: &str,
    ) -> Vec<u8> {
        let mut buf = vec![0u8; 22];
        LittleEndian::write_u32(&mut buf[0..4], father);
        LittleEndian::write_u16(&mut buf[4..6], entry_type);
        LittleEndian::write_u32(&mut buf[6..10], id);
        LittleEndian::write_u32(&mut buf[10..14], column_type);
        LittleEndian::write_u32(&mut buf[14..18], 0);
        LittleEndian::write_u32(&mut buf[18..22], 0);

        let name_bytes = name.as_bytes();
        buf.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        buf.extend_from_slice(name_bytes);

        let template_bytes = template.as_bytes();
        buf.extend_from_slice(&(template_bytes.len() as u16).to_le_bytes());
        buf.extend_from_slice(template_bytes);
        buf
    }

    fn leaf(data: Vec<u8>) -> LeafValue {
        LeafValue {
            key: Vec::new(),
            data,
            leaf_page_number: 4,
            page_flags: 0,
        }
    }

    #[test]
    fn test_build_simple_table_with_columns() {
        let leaves = vec![
            leaf(entry_bytes(1, catalog_type::TABLE, 1, 0, "Msg", "")),
            leaf(entry_bytes(1, catalog_type::COLUMN, 2, 4, "Id", "")),
            leaf(entry_bytes(1, catalog_type::COLUMN, 3, 12, "Subject", "")),
        ];
        let catalog = Catalog::build(&leaves, CatalogOptions::default()).unwrap();
        let table = catalog.table("Msg").unwrap();
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_template_table_inheritance() {
        let leaves = vec![
            leaf(entry_bytes(1, catalog_type::TABLE, 1, 0, "Base", "")),
            leaf(entry_bytes(1, catalog_type::COLUMN, 2, 4, "Id", "")),
            leaf(entry_bytes(10, catalog_type::TABLE, 10, 0, "Derived", "Base")),
            leaf(entry_bytes(10, catalog_type::COLUMN, 11, 12, "Extra", "")),
        ];
        let catalog = Catalog::build(&leaves, CatalogOptions::default()).unwrap();
        let derived = catalog.table("Derived").unwrap();
        let names: Vec<&str> = derived.columns.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Id"));
        assert!(names.contains(&"Extra"));
    }

    #[test]
    fn test_ignore_template_table_option() {
        let leaves = vec![
            leaf(entry_bytes(1, catalog_type::TABLE, 1, 0, "Base", "")),
            leaf(entry_bytes(1, catalog_type::COLUMN, 2, 4, "Id", "")),
            leaf(entry_bytes(10, catalog_type::TABLE, 10, 0, "Derived", "Base")),
            leaf(entry_bytes(10, catalog_type::COLUMN, 11, 12, "Extra", "")),
        ];
        let catalog = Catalog::build(
            &leaves,
            CatalogOptions {
                ignore_template_table: true,
            },
        )
        .unwrap();
        let derived = catalog.table("Derived").unwrap();
        assert_eq!(derived.columns.len(), 1);
    }
}
