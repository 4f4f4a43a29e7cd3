//! Column value decoding.
//!
//! `decode_value` takes the raw bytes stored for one column in one record
//! (already sliced out by [`crate::edb::record`]) and the column's
//! `JET_coltyp` code, and produces a typed [`Value`].

use byteorder::{ByteOrder, LittleEndian};

use crate::edb::constants::column_type;
use crate::edb::error::{EdbError, InputErrorKind};

/// A decoded column value. Large/SuperLarge variants hold a long-value
/// identifier rather than inline bytes; resolving them requires
/// `crate::edb::longvalue`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    UInt8(u8),
    Int16(i16),
    Int32(i32),
    Currency(i64),
    Float32(f32),
    Float64(f64),
    DateTime(f64),
    Binary(Vec<u8>),
    Text(String),
    LargeBinary(Vec<u8>),
    LargeText(String),
    SuperLargeValue(u32),
    UInt32(u32),
    Int64(i64),
    Guid([u8; 16]),
    UInt16(u16),
}

impl Value {
    /// Render an OLE Automation date ([`Value::DateTime`]) as an RFC 3339
    /// string, without depending on a calendar crate. The OLE epoch is
    /// 1899-12-30; each unit is one day, with the fractional part encoding
    /// time of day.
    pub fn datetime_to_rfc3339(days_since_ole_epoch: f64) -> String {
        const OLE_EPOCH_JDN: i64 = 2_415_019; // Julian day number of 1899-12-30
        let day_part = days_since_ole_epoch.trunc();
        let frac = days_since_ole_epoch - day_part;
        let jdn = OLE_EPOCH_JDN + day_part as i64;

        let (year, month, day) = julian_day_to_gregorian(jdn);

        let total_seconds = (frac.abs() * 86400.0).round() as i64;
        let hour = total_seconds / 3600;
        let minute = (total_seconds % 3600) / 60;
        let second = total_seconds % 60;

        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            year, month, day, hour, minute, second
        )
    }
}

/// Fliegel & Van Flandern's algorithm for converting a Julian day number to
/// a proleptic Gregorian calendar date.
fn julian_day_to_gregorian(jdn: i64) -> (i64, u32, u32) {
    let l = jdn + 68569;
    let n = (4 * l) / 146097;
    let l = l - (146097 * n + 3) / 4;
    let i = (4000 * (l + 1)) / 1461001;
    let l = l - (1461 * i) / 4 + 31;
    let j = (80 * l) / 2447;
    let day = (l - (2447 * j) / 80) as u32;
    let l = j / 11;
    let month = (j + 2 - 12 * l) as u32;
    let year = 100 * (n - 49) + i + l;
    (year, month, day)
}

/// Decode `data` according to `coltyp`. `data` must already be exactly the
/// bytes stored for this column (no surrounding record framing).
pub fn decode_value(data: &[u8], coltyp: u32) -> Result<Value, EdbError> {
    if data.is_empty() && coltyp != column_type::TEXT && coltyp != column_type::LONG_TEXT {
        return Ok(Value::Null);
    }

    match coltyp {
        column_type::NIL => Ok(Value::Null),
        column_type::BOOLEAN => Ok(Value::Boolean(data.first().copied().unwrap_or(0) != 0)),
        column_type::UNSIGNED_BYTE => Ok(Value::UInt8(data.first().copied().unwrap_or(0))),
        column_type::SHORT => expect_len(data, 2).map(|d| Value::Int16(LittleEndian::read_i16(d))),
        column_type::LONG => expect_len(data, 4).map(|d| Value::Int32(LittleEndian::read_i32(d))),
        column_type::CURRENCY => {
            expect_len(data, 8).map(|d| Value::Currency(LittleEndian::read_i64(d)))
        }
        column_type::IEEE_SINGLE => {
            expect_len(data, 4).map(|d| Value::Float32(LittleEndian::read_f32(d)))
        }
        column_type::IEEE_DOUBLE => {
            expect_len(data, 8).map(|d| Value::Float64(LittleEndian::read_f64(d)))
        }
        column_type::DATE_TIME => {
            expect_len(data, 8).map(|d| Value::DateTime(LittleEndian::read_f64(d)))
        }
        column_type::BINARY => Ok(Value::Binary(data.to_vec())),
        column_type::TEXT => Ok(Value::Text(decode_text(data))),
        column_type::LONG_BINARY => Ok(Value::LargeBinary(data.to_vec())),
        column_type::LONG_TEXT => Ok(Value::LargeText(decode_text(data))),
        column_type::SUPER_LONG_VALUE => {
            expect_len(data, 4).map(|d| Value::SuperLargeValue(LittleEndian::read_u32(d)))
        }
        column_type::UNSIGNED_LONG => {
            expect_len(data, 4).map(|d| Value::UInt32(LittleEndian::read_u32(d)))
        }
        column_type::LONG_LONG => {
            expect_len(data, 8).map(|d| Value::Int64(LittleEndian::read_i64(d)))
        }
        column_type::GUID => expect_len(data, 16).map(|d| {
            let mut guid = [0u8; 16];
            guid.copy_from_slice(d);
            Value::Guid(guid)
        }),
        column_type::UNSIGNED_SHORT => {
            expect_len(data, 2).map(|d| Value::UInt16(LittleEndian::read_u16(d)))
        }
        other => Err(EdbError::input(
            InputErrorKind::InvalidData,
            format!("unsupported column type {other}"),
        )),
    }
}

fn expect_len(data: &[u8], len: usize) -> Result<&[u8], EdbError> {
    if data.len() < len {
        return Err(EdbError::input(
            InputErrorKind::InvalidData,
            format!("column value too short: got {} bytes, need {len}", data.len()),
        ));
    }
    Ok(&data[..len])
}

/// Decode a TEXT/LONG_TEXT payload as UTF-16LE when the byte count is even
/// and plausible, falling back to the codepage's single-byte form
/// otherwise. A full codepage table is out of scope; UTF-16 (codepage
/// 1200, the modern default) and lossy ASCII/Latin-1 cover the common
/// cases.
fn decode_text(data: &[u8]) -> String {
    if data.len() % 2 == 0 {
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    data.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_null_for_empty_fixed_column() {
        let v = decode_value(&[], column_type::LONG).unwrap();
        assert_eq!(v, Value::Null);
    }

    #[test]
    fn test_decode_boolean_true() {
        let v = decode_value(&[0xff], column_type::BOOLEAN).unwrap();
        assert_eq!(v, Value::Boolean(true));
    }

    #[test]
    fn test_decode_long_little_endian() {
        let v = decode_value(&(-5i32).to_le_bytes(), column_type::LONG).unwrap();
        assert_eq!(v, Value::Int32(-5));
    }

    #[test]
    fn test_decode_unicode_text() {
        let data: Vec<u8> = "hi".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let v = decode_value(&data, column_type::TEXT).unwrap();
        assert_eq!(v, Value::Text("hi".to_string()));
    }

    #[test]
    fn test_decode_too_short_is_error() {
        let err = decode_value(&[1, 2], column_type::LONG);
        assert!(err.is_err());
    }

    #[test]
    fn test_datetime_to_rfc3339_epoch() {
        let s = Value::datetime_to_rfc3339(0.0);
        assert_eq!(s, "1899-12-30T00:00:00Z");
    }

    #[test]
    fn test_datetime_to_rfc3339_known_date() {
        // 2000-01-01 is OLE date 36526.
        let s = Value::datetime_to_rfc3339(36526.0);
        assert_eq!(s, "2000-01-01T00:00:00Z");
    }
}
