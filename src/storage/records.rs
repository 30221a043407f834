use chrono::{DateTime, NaiveDate};

use crate::db::table::core::field::{DataType, Field};
use crate::db::table::core::record::Record;
use crate::db::table::core::value::{parse_bool, parse_date, parse_datetime, DATETIME_FRACTION_FORMAT, DATE_FORMAT};
use crate::error::{DbError, Result};
use crate::storage::codec::{ByteReader, ByteWriter};

const NULL_MARKER: u8 = 1;
const PRESENT_MARKER: u8 = 0;

/// `.trd` layout: per record a u32 payload length, then per field (schema
/// order) a NULL marker and, when present, the typed encoding. FLOAT is kept
/// at f64 width, DATETIME as i64 seconds plus u32 nanoseconds.
pub fn encode_records(fields: &[Field], records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new();
    for record in records {
        let mut payload = ByteWriter::new();
        for field in fields {
            match record.value(&field.name) {
                None => payload.put_u8(NULL_MARKER),
                Some(value) => {
                    payload.put_u8(PRESENT_MARKER);
                    encode_value(&mut payload, field, value)?;
                }
            }
        }
        writer.put_count(payload.len())?;
        writer.put_bytes(&payload.into_bytes());
    }
    Ok(writer.into_bytes())
}

pub fn decode_records(fields: &[Field], bytes: &[u8]) -> Result<Vec<Record>> {
    let mut reader = ByteReader::new(bytes);
    let mut records = vec![];
    while !reader.is_at_end() {
        let length = reader.read_count()?;
        let mut payload = ByteReader::new(reader.take(length)?);
        let mut record = Record::new();
        for field in fields {
            let value = match payload.read_u8()? {
                NULL_MARKER => None,
                PRESENT_MARKER => Some(decode_value(&mut payload, field)?),
                marker => {
                    return Err(DbError::malformed(format!(
                        "bad NULL marker {} for `{}` in record {}",
                        marker,
                        field.name,
                        records.len()
                    )));
                }
            };
            record.insert(field.name.clone(), value);
        }
        if !payload.is_at_end() {
            return Err(DbError::malformed(format!(
                "record {} is longer than its schema",
                records.len()
            )));
        }
        records.push(record);
    }
    Ok(records)
}

fn encode_value(writer: &mut ByteWriter, field: &Field, value: &str) -> Result<()> {
    let unencodable = || {
        DbError::Conversion(format!(
            "Value '{}' of field `{}` cannot be stored as {}",
            value,
            field.name,
            field.typestring()
        ))
    };
    let integer = || value.trim().parse::<i64>().map_err(|_| unencodable());
    match field.data_type {
        DataType::TinyInt => writer.put_i8(i8::try_from(integer()?).map_err(|_| unencodable())?),
        DataType::SmallInt => writer.put_i16(i16::try_from(integer()?).map_err(|_| unencodable())?),
        DataType::Int => writer.put_i32(i32::try_from(integer()?).map_err(|_| unencodable())?),
        DataType::BigInt => writer.put_i64(integer()?),
        DataType::Float | DataType::Double => {
            writer.put_f64(value.trim().parse::<f64>().map_err(|_| unencodable())?)
        }
        DataType::Decimal
        | DataType::Char
        | DataType::Varchar
        | DataType::Text
        | DataType::Enum => writer.put_string(value)?,
        DataType::Date => {
            let date = parse_date(value).ok_or_else(unencodable)?;
            writer.put_i32(chrono::Datelike::num_days_from_ce(&date));
        }
        DataType::DateTime | DataType::Timestamp => {
            let datetime = parse_datetime(value).ok_or_else(unencodable)?;
            let datetime = datetime.and_utc();
            writer.put_i64(datetime.timestamp());
            writer.put_u32(datetime.timestamp_subsec_nanos());
        }
        DataType::Bool => writer.put_u8(u8::from(parse_bool(value).ok_or_else(unencodable)?)),
    }
    Ok(())
}

fn decode_value(reader: &mut ByteReader, field: &Field) -> Result<String> {
    let value = match field.data_type {
        DataType::TinyInt => reader.read_i8()?.to_string(),
        DataType::SmallInt => reader.read_i16()?.to_string(),
        DataType::Int => reader.read_i32()?.to_string(),
        DataType::BigInt => reader.read_i64()?.to_string(),
        DataType::Float | DataType::Double => reader.read_f64()?.to_string(),
        DataType::Decimal
        | DataType::Char
        | DataType::Varchar
        | DataType::Text
        | DataType::Enum => reader.read_string()?,
        DataType::Date => {
            let days = reader.read_i32()?;
            NaiveDate::from_num_days_from_ce_opt(days)
                .ok_or_else(|| DbError::malformed(format!("bad date {} in `{}`", days, field.name)))?
                .format(DATE_FORMAT)
                .to_string()
        }
        DataType::DateTime | DataType::Timestamp => {
            let seconds = reader.read_i64()?;
            let nanos = reader.read_u32()?;
            DateTime::from_timestamp(seconds, nanos)
                .ok_or_else(|| {
                    DbError::malformed(format!("bad timestamp {} in `{}`", seconds, field.name))
                })?
                .naive_utc()
                .format(DATETIME_FRACTION_FORMAT)
                .to_string()
        }
        DataType::Bool => (reader.read_u8()? != 0).to_string(),
    };
    Ok(value)
}
