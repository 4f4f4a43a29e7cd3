//! Record decoding: splitting one leaf value's raw bytes into fixed,
//! variable, and tagged column regions and extracting each column's bytes.
//!
//! Layout of a record's data payload (spec.md §4.9):
//!
//! 0. **Header** — `last_fixed_size_column_id: u8`,
//!    `last_variable_size_column_id: u8`, `variable_size_data_types_offset: u16`.
//! 1. **Fixed region** — one slot per column whose identifier is
//!    `<= last_fixed_size_column_id`, in ascending identifier order, each
//!    exactly that column's declared width, occupied (zero-filled or
//!    stale) even when NULL. Immediately after: a null bitmap, one bit per
//!    fixed column in the same order, rounded up to a byte.
//! 2. **Variable region** — starting at `variable_size_data_types_offset`:
//!    a `u16` end-offset per variable-size column (cumulative from the
//!    start of the variable data area), followed by the variable data
//!    area itself. An end-offset with the high bit set marks that column
//!    NULL (and its length is the offset with the high bit masked off,
//!    same as the previous column's end).
//! 3. **Tagged region** — present only if any tagged columns are
//!    populated: `(column_identifier: u16, end_offset: u16)` pairs
//!    followed by the tagged data area, terminated implicitly by the end
//!    of the record. On NEW_RECORD_FORMAT pages each value's bytes begin
//!    with a 1-byte per-value flags field (`COMPRESSED`, `LONG_VALUE`,
//!    `MULTI_VALUE`); a `LONG_VALUE` value's remaining bytes are an 8-byte
//!    `(id: u32, total_size: u32)` reference into the long-value tree, and
//!    a `MULTI_VALUE` value's remaining bytes are themselves a nested
//!    offset-table list of sub-values.

use byteorder::{ByteOrder, LittleEndian};

use crate::edb::catalog::ColumnDef;
use crate::edb::constants::{column_flags, tagged_value_flags};
use crate::edb::error::{EdbError, InputErrorKind};

const VARIABLE_SIZE_NULL_FLAG: u16 = 0x8000;
const VARIABLE_SIZE_MASK: u16 = 0x7fff;
const RECORD_HEADER_SIZE: usize = 4;
const TAGGED_ENTRY_SIZE: usize = 4;

/// A long-value reference parsed out of a tagged column's `LONG_VALUE`
/// flag (spec.md §4.9): the identifier to look up in the table's
/// long-value tree, and the value's total reassembled size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongValueRef {
    pub id: u32,
    pub total_size: u32,
}

/// A decoded record's raw column slices, keyed by column identifier. Call
/// [`crate::edb::column::decode_value`] on each slice to get a typed
/// value. Tagged columns flagged `LONG_VALUE` or `MULTI_VALUE` are kept
/// out of `values` and surfaced instead through [`RawRecord::long_value`]
/// and [`RawRecord::multi_value`].
pub struct RawRecord {
    pub values: std::collections::HashMap<u32, Option<Vec<u8>>>,
    pub long_values: std::collections::HashMap<u32, LongValueRef>,
    pub multi_values: std::collections::HashMap<u32, Vec<Vec<u8>>>,
}

impl RawRecord {
    pub fn get(&self, column: &ColumnDef) -> Option<&[u8]> {
        self.values
            .get(&column.identifier)
            .and_then(|v| v.as_deref())
    }

    pub fn long_value(&self, column: &ColumnDef) -> Option<LongValueRef> {
        self.long_values.get(&column.identifier).copied()
    }

    pub fn multi_value(&self, column: &ColumnDef) -> Option<&[Vec<u8>]> {
        self.multi_values
            .get(&column.identifier)
            .map(|v| v.as_slice())
    }
}

/// Decode one record given the table's columns in catalog order.
///
/// `columns` must be ordered exactly as they are laid out on disk: all
/// fixed columns first (by declared fixed-column index), then all
/// variable columns, then tagged columns are addressed by identifier and
/// need no fixed ordering. `new_record_format` should reflect the
/// originating leaf page's `page_flags::IS_NEW_RECORD_FORMAT` bit — it
/// controls whether each tagged value carries a leading per-value flags
/// byte.
pub fn decode_record(
    data: &[u8],
    columns: &[ColumnDef],
    new_record_format: bool,
) -> Result<RawRecord, EdbError> {
    if data.len() < RECORD_HEADER_SIZE {
        return Err(EdbError::input(
            InputErrorKind::InvalidData,
            "record shorter than its data-definition header",
        ));
    }
    let last_fixed_size_column_id = data[0];
    let last_variable_size_column_id = data[1];
    let variable_size_data_types_offset = LittleEndian::read_u16(&data[2..4]) as usize;

    let mut fixed: Vec<&ColumnDef> = columns
        .iter()
        .filter(|c| {
            c.flags & column_flags::FIXED != 0
                && c.identifier <= last_fixed_size_column_id as u32
        })
        .collect();
    fixed.sort_by_key(|c| c.identifier);
    let mut variable: Vec<&ColumnDef> = columns
        .iter()
        .filter(|c| {
            c.flags & column_flags::FIXED == 0
                && c.flags & column_flags::TAGGED == 0
                && c.identifier > last_fixed_size_column_id as u32
                && c.identifier <= last_variable_size_column_id as u32
        })
        .collect();
    variable.sort_by_key(|c| c.identifier);
    let tagged: Vec<&ColumnDef> = columns
        .iter()
        .filter(|c| c.flags & column_flags::TAGGED != 0)
        .collect();

    let mut values = std::collections::HashMap::new();
    let mut long_values = std::collections::HashMap::new();
    let mut multi_values = std::collections::HashMap::new();

    // Fixed region: every fixed column up to last_fixed_size_column_id
    // occupies its slot regardless of NULL-ness; the null bitmap right
    // after the fixed data decides whether the bytes are meaningful.
    let mut offset = RECORD_HEADER_SIZE;
    let mut fixed_spans: Vec<(usize, usize)> = Vec::with_capacity(fixed.len());
    for column in &fixed {
        let size = fixed_column_size(column.column_type);
        if offset + size > data.len() {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                format!("fixed column {} extends past end of record", column.name),
            ));
        }
        fixed_spans.push((offset, offset + size));
        offset += size;
    }

    let fixed_null_bitmap_size = fixed.len().div_ceil(8);
    if offset + fixed_null_bitmap_size > data.len() {
        return Err(EdbError::input(
            InputErrorKind::InvalidData,
            "record shorter than its fixed-column null bitmap",
        ));
    }
    let null_bitmap = &data[offset..offset + fixed_null_bitmap_size];
    for (i, column) in fixed.iter().enumerate() {
        let is_null = null_bitmap
            .get(i / 8)
            .map(|&b| b & (1 << (i % 8)) != 0)
            .unwrap_or(false);
        if is_null {
            values.insert(column.identifier, None);
        } else {
            let (start, stop) = fixed_spans[i];
            values.insert(column.identifier, Some(data[start..stop].to_vec()));
        }
    }
    offset += fixed_null_bitmap_size;

    // Variable region starts at the header-declared offset, not
    // immediately after the fixed region (there can be padding, or the
    // header offset can equal `offset` exactly when there is none).
    if !variable.is_empty() {
        let var_start = if variable_size_data_types_offset >= offset {
            variable_size_data_types_offset
        } else {
            offset
        };
        let table_size = variable.len() * 2;
        if var_start + table_size > data.len() {
            return Err(EdbError::input(
                InputErrorKind::InvalidData,
                "record shorter than its variable-column offset table",
            ));
        }
        let offset_table = &data[var_start..var_start + table_size];
        let variable_data_start = var_start + table_size;

        let mut prev_end = 0usize;
        for (i, column) in variable.iter().enumerate() {
            let raw = LittleEndian::read_u16(&offset_table[i * 2..i * 2 + 2]);
            let is_null = raw & VARIABLE_SIZE_NULL_FLAG != 0;
            let end = (raw & VARIABLE_SIZE_MASK) as usize;

            if is_null {
                values.insert(column.identifier, None);
                continue;
            }

            let start = variable_data_start + prev_end;
            let stop = variable_data_start + end;
            if stop > data.len() || stop < start {
                return Err(EdbError::input(
                    InputErrorKind::InvalidData,
                    format!("variable column {} out of bounds", column.name),
                ));
            }
            values.insert(column.identifier, Some(data[start..stop].to_vec()));
            prev_end = end;
        }
        offset = variable_data_start + prev_end;
    }

    if !tagged.is_empty() && offset < data.len() {
        decode_tagged_region(
            &data[offset..],
            &tagged,
            new_record_format,
            &mut values,
            &mut long_values,
            &mut multi_values,
        )?;
    }

    for column in tagged.iter() {
        values.entry(column.identifier).or_insert(None);
    }

    Ok(RawRecord {
        values,
        long_values,
        multi_values,
    })
}

/// Decode the tagged region: an `(identifier: u16, end_offset: u16)` entry
/// array followed by the data area it indexes into.
///
/// The entry count isn't stored explicitly — it's derived from the first
/// entry's (masked) end offset, which doubles as the byte length of the
/// entry array itself, since the data area starts immediately after it:
/// `entry_count = first_entry.end_offset / TAGGED_ENTRY_SIZE`.
fn decode_tagged_region(
    data: &[u8],
    tagged: &[&ColumnDef],
    new_record_format: bool,
    values: &mut std::collections::HashMap<u32, Option<Vec<u8>>>,
    long_values: &mut std::collections::HashMap<u32, LongValueRef>,
    multi_values: &mut std::collections::HashMap<u32, Vec<Vec<u8>>>,
) -> Result<(), EdbError> {
    if data.len() < TAGGED_ENTRY_SIZE {
        return Ok(());
    }

    let first_end = LittleEndian::read_u16(&data[2..4]) & VARIABLE_SIZE_MASK;
    let mut entry_count = first_end as usize / TAGGED_ENTRY_SIZE;
    if entry_count == 0 || entry_count * TAGGED_ENTRY_SIZE > data.len() {
        entry_count = data.len() / TAGGED_ENTRY_SIZE;
    }

    let mut entries: Vec<(u16, u16)> = Vec::with_capacity(entry_count);
    for i in 0..entry_count {
        let cursor = i * TAGGED_ENTRY_SIZE;
        let identifier = LittleEndian::read_u16(&data[cursor..cursor + 2]);
        let end_offset = LittleEndian::read_u16(&data[cursor + 2..cursor + 4]);
        entries.push((identifier, end_offset));
    }

    let data_area_start = entry_count * TAGGED_ENTRY_SIZE;
    let mut prev_end = 0usize;
    for (identifier, raw_end) in entries {
        let end = (raw_end & VARIABLE_SIZE_MASK) as usize;
        let is_null = raw_end & VARIABLE_SIZE_NULL_FLAG != 0;
        let column = tagged.iter().find(|c| c.identifier as u16 == identifier);
        let Some(column) = column else {
            prev_end = end;
            continue;
        };
        if is_null {
            values.insert(column.identifier, None);
            prev_end = end;
            continue;
        }
        let start = data_area_start + prev_end;
        let stop = data_area_start + end;
        if stop > data.len() || stop < start {
            values.insert(column.identifier, None);
            prev_end = end;
            continue;
        }
        prev_end = end;

        let slice = &data[start..stop];
        let (flags, body) = if new_record_format && !slice.is_empty() {
            (slice[0], &slice[1..])
        } else {
            (0u8, slice)
        };

        if flags & tagged_value_flags::LONG_VALUE != 0 {
            if body.len() < 8 {
                values.insert(column.identifier, None);
                continue;
            }
            long_values.insert(
                column.identifier,
                LongValueRef {
                    id: LittleEndian::read_u32(&body[0..4]),
                    total_size: LittleEndian::read_u32(&body[4..8]),
                },
            );
        } else if flags & tagged_value_flags::MULTI_VALUE != 0 {
            multi_values.insert(column.identifier, decode_multi_value_list(body));
        } else {
            values.insert(column.identifier, Some(body.to_vec()));
        }
    }
    Ok(())
}

/// Decode a `MULTI_VALUE` tagged value's body: a nested list of sub-values
/// addressed by a `u16` end-offset table with no per-entry identifier (all
/// sub-values belong to the same column), mirroring the variable-size
/// region's offset table. The entry count is derived from the first
/// offset the same way the tagged entry array's count is.
fn decode_multi_value_list(data: &[u8]) -> Vec<Vec<u8>> {
    const ENTRY_SIZE: usize = 2;
    if data.len() < ENTRY_SIZE {
        return Vec::new();
    }

    let first_end = LittleEndian::read_u16(&data[0..2]) & VARIABLE_SIZE_MASK;
    let mut entry_count = first_end as usize / ENTRY_SIZE;
    if entry_count == 0 || entry_count * ENTRY_SIZE > data.len() {
        entry_count = data.len() / ENTRY_SIZE;
    }

    let data_area_start = entry_count * ENTRY_SIZE;
    let mut out = Vec::with_capacity(entry_count);
    let mut prev_end = 0usize;
    for i in 0..entry_count {
        let cursor = i * ENTRY_SIZE;
        let raw = LittleEndian::read_u16(&data[cursor..cursor + ENTRY_SIZE]);
        let end = (raw & VARIABLE_SIZE_MASK) as usize;
        let is_null = raw & VARIABLE_SIZE_NULL_FLAG != 0;
        if is_null {
            prev_end = end;
            continue;
        }
        let start = data_area_start + prev_end;
        let stop = data_area_start + end;
        prev_end = end;
        if stop > data.len() || stop < start {
            continue;
        }
        out.push(data[start..stop].to_vec());
    }
    out
}

fn fixed_column_size(coltyp: u32) -> usize {
    use crate::edb::constants::column_type::*;
    match coltyp {
        BOOLEAN | UNSIGNED_BYTE => 1,
        SHORT | UNSIGNED_SHORT => 2,
        LONG | IEEE_SINGLE | UNSIGNED_LONG => 4,
        CURRENCY | IEEE_DOUBLE | DATE_TIME | LONG_LONG | SUPER_LONG_VALUE => 8,
        GUID => 16,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edb::constants::column_type;

    fn col(id: u32, name: &str, ctype: u32, flags: u32) -> ColumnDef {
        ColumnDef {
            identifier: id,
            name: name.to_string(),
            column_type: ctype,
            flags,
        }
    }

    #[test]
    fn test_decode_two_fixed_columns_no_nulls() {
        let columns = vec![
            col(1, "a", column_type::UNSIGNED_BYTE, column_flags::FIXED),
            col(2, "b", column_type::LONG, column_flags::FIXED),
        ];
        let mut data = vec![2u8, 2, 0, 0]; // header: last_fixed=2, last_variable=2, var_offset=0
        data.push(7); // column a
        data.extend_from_slice(&42i32.to_le_bytes()); // column b
        data.push(0u8); // null bitmap, 1 byte for 2 columns

        let record = decode_record(&data, &columns, false).unwrap();
        assert_eq!(record.get(&columns[0]), Some(&[7u8][..]));
        assert_eq!(record.get(&columns[1]), Some(&42i32.to_le_bytes()[..]));
    }

    #[test]
    fn test_fixed_column_null_bitmap() {
        let columns = vec![col(1, "a", column_type::LONG, column_flags::FIXED)];
        let mut data = vec![1u8, 1, 0, 0]; // header: last_fixed=1, last_variable=1
        data.extend_from_slice(&[0u8; 4]); // fixed column slot (contents irrelevant, NULL)
        data.push(0b0000_0001u8); // bit 0 set -> null
        let record = decode_record(&data, &columns, false).unwrap();
        assert_eq!(record.get(&columns[0]), None);
    }

    #[test]
    fn test_variable_column_roundtrip() {
        let columns = vec![col(10, "name", column_type::TEXT, 0)];
        // header: last_fixed=0, last_variable=10, var_offset=4 (right after header)
        let mut data = vec![0u8, 10, 4, 0];
        data.extend_from_slice(&5u16.to_le_bytes()); // end offset
        data.extend_from_slice(b"hello");

        let record = decode_record(&data, &columns, false).unwrap();
        assert_eq!(record.get(&columns[0]), Some(&b"hello"[..]));
    }

    #[test]
    fn test_tagged_region_entry_count_from_first_offset() {
        let columns = vec![col(20, "note", column_type::TEXT, column_flags::TAGGED)];
        let mut data = vec![0u8, 0, 0, 0]; // header: no fixed/variable columns
        data.extend_from_slice(&20u16.to_le_bytes()); // entry: identifier
        data.extend_from_slice(&4u16.to_le_bytes()); // entry: end offset == entry_count * 4
        data.extend_from_slice(b"abcd");

        let record = decode_record(&data, &columns, false).unwrap();
        assert_eq!(record.get(&columns[0]), Some(&b"abcd"[..]));
    }

    #[test]
    fn test_tagged_long_value_flag_is_parsed_out_of_new_record_format() {
        let columns = vec![
            col(
                21,
                "attachment",
                column_type::SUPER_LONG_VALUE,
                column_flags::TAGGED,
            ),
            col(22, "label", column_type::TEXT, column_flags::TAGGED),
        ];

        let mut value0 = vec![tagged_value_flags::LONG_VALUE];
        value0.extend_from_slice(&7u32.to_le_bytes());
        value0.extend_from_slice(&100u32.to_le_bytes());

        let mut value1 = vec![0u8];
        value1.extend_from_slice(b"xyz");

        let end0 = value0.len();
        let end1 = end0 + value1.len();

        let mut data = vec![0u8, 0, 0, 0];
        data.extend_from_slice(&21u16.to_le_bytes());
        data.extend_from_slice(&(end0 as u16).to_le_bytes());
        data.extend_from_slice(&22u16.to_le_bytes());
        data.extend_from_slice(&(end1 as u16).to_le_bytes());
        data.extend_from_slice(&value0);
        data.extend_from_slice(&value1);

        let record = decode_record(&data, &columns, true).unwrap();
        let long_ref = record.long_value(&columns[0]).unwrap();
        assert_eq!(long_ref.id, 7);
        assert_eq!(long_ref.total_size, 100);
        assert_eq!(record.get(&columns[1]), Some(&b"xyz"[..]));
    }

    #[test]
    fn test_tagged_multi_value_flag_decodes_recursive_list() {
        let columns = vec![
            col(30, "tags", column_type::TEXT, column_flags::TAGGED),
            col(31, "other", column_type::TEXT, column_flags::TAGGED),
        ];

        // Inner multi-value list: two sub-values addressed by their own
        // (id-less) offset table.
        let sub0 = b"wxyz".to_vec();
        let sub1 = b"bb".to_vec();
        let inner_end0 = sub0.len();
        let inner_end1 = inner_end0 + sub1.len();
        let mut inner = Vec::new();
        inner.extend_from_slice(&(inner_end0 as u16).to_le_bytes());
        inner.extend_from_slice(&(inner_end1 as u16).to_le_bytes());
        inner.extend_from_slice(&sub0);
        inner.extend_from_slice(&sub1);

        let mut value0 = vec![tagged_value_flags::MULTI_VALUE];
        value0.extend_from_slice(&inner);

        let mut value1 = vec![0u8];
        value1.extend_from_slice(b"z");

        let end0 = value0.len();
        let end1 = end0 + value1.len();

        let mut data = vec![0u8, 0, 0, 0];
        data.extend_from_slice(&30u16.to_le_bytes());
        data.extend_from_slice(&(end0 as u16).to_le_bytes());
        data.extend_from_slice(&31u16.to_le_bytes());
        data.extend_from_slice(&(end1 as u16).to_le_bytes());
        data.extend_from_slice(&value0);
        data.extend_from_slice(&value1);

        let record = decode_record(&data, &columns, true).unwrap();
        let parts = record.multi_value(&columns[0]).unwrap();
        assert_eq!(parts, &[b"wxyz".to_vec(), b"bb".to_vec()]);
        assert_eq!(record.get(&columns[1]), Some(&b"z"[..]));
    }
}
