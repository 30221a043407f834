use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::db::table::core::field::DataType;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Like [`DATETIME_FORMAT`], with a fraction only when one is present.
pub const DATETIME_FRACTION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") || value == "1" {
        return Some(true);
    }
    if value.eq_ignore_ascii_case("false") || value == "0" {
        return Some(false);
    }
    None
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Accepts `YYYY-MM-DD HH:MM:SS` and the ISO-8601 forms, with or without offset.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATETIME_FRACTION_FORMAT))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|datetime| datetime.naive_utc())
        })
}

/// Renders a float the way values are stored: shortest round-trip form,
/// or fixed decimals when a scale is known.
pub fn format_float(value: f64, scale: Option<u32>) -> String {
    match scale {
        Some(scale) => format!("{:.*}", scale as usize, value),
        None => format!("{}", value),
    }
}

/// A stored string interpreted through its declared type.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Never fails: anything that does not parse as `data_type` becomes `Text`.
    pub fn convert(raw: Option<&str>, data_type: DataType) -> Value {
        let raw = match raw {
            Some(raw) => raw,
            None => return Value::Null,
        };
        let converted = match data_type {
            DataType::TinyInt | DataType::SmallInt | DataType::Int | DataType::BigInt => {
                raw.trim().parse::<i64>().ok().map(Value::Int)
            }
            DataType::Float | DataType::Double | DataType::Decimal => {
                raw.trim().parse::<f64>().ok().map(Value::Float)
            }
            DataType::Bool => parse_bool(raw).map(Value::Bool),
            DataType::Date => parse_date(raw).map(Value::Date),
            DataType::DateTime | DataType::Timestamp => parse_datetime(raw).map(Value::DateTime),
            DataType::Char | DataType::Varchar | DataType::Text | DataType::Enum => None,
        };
        converted.unwrap_or_else(|| Value::Text(raw.to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `None` when either side is NULL.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::DateTime(b)) => Some(a.and_time(NaiveTime::MIN).cmp(b)),
            (Value::DateTime(a), Value::Date(b)) => Some(a.cmp(&b.and_time(NaiveTime::MIN))),
            (a, b) => Some(a.to_string().cmp(&b.to_string())),
        }
    }

    /// Sort order used by ORDER BY: NULLs first, incomparable values equal.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", format_float(*value, None)),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Date(value) => write!(f, "{}", value.format(DATE_FORMAT)),
            Value::DateTime(value) => write!(f, "{}", value.format(DATETIME_FORMAT)),
            Value::Text(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_falls_back_to_text() {
        assert_eq!(Value::convert(Some("42"), DataType::Int), Value::Int(42));
        assert!(matches!(
            Value::convert(Some("forty"), DataType::Int),
            Value::Text(ref text) if text == "forty"
        ));
        assert!(matches!(
            Value::convert(Some("2024-13-01"), DataType::Date),
            Value::Text(_)
        ));
        assert!(Value::convert(None, DataType::Text).is_null());
    }

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert_eq!(Value::Int(7), Value::convert(Some("07"), DataType::Int));
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Float(10.0), Value::Int(10));
    }

    #[test]
    fn null_is_never_equal() {
        assert_ne!(Value::Null, Value::Null);
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Null.sort_cmp(&Value::Int(1)), Ordering::Less);
    }

    #[test]
    fn mixed_types_compare_as_text() {
        let text = Value::Text("abc".to_string());
        assert_eq!(text.compare(&Value::Int(5)), Some(Ordering::Greater));
    }

    #[test]
    fn dates_compare_with_datetimes() {
        let date = Value::convert(Some("2024-05-01"), DataType::Date);
        let datetime = Value::convert(Some("2024-05-01 10:00:00"), DataType::DateTime);
        assert_eq!(date.compare(&datetime), Some(Ordering::Less));
        assert_eq!(datetime.to_string(), "2024-05-01 10:00:00");
    }

    #[test]
    fn bools_accept_digit_forms() {
        assert_eq!(
            Value::convert(Some("1"), DataType::Bool),
            Value::convert(Some("TRUE"), DataType::Bool)
        );
    }

    #[test]
    fn floats_format_with_optional_scale() {
        assert_eq!(format_float(2000.0, None), "2000");
        assert_eq!(format_float(2.5, None), "2.5");
        assert_eq!(format_float(3.14159, Some(2)), "3.14");
    }
}
