use std::fmt;

use crate::db::table::core::value::{parse_bool, parse_date, parse_datetime};
use crate::error::{DbError, Result};

pub const DEFAULT_CHAR_SIZE: u32 = 1;
pub const DEFAULT_VARCHAR_SIZE: u32 = 255;
pub const MAX_NAME_BYTES: usize = 127;
pub const MAX_ENUM_BYTES: usize = 511;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Char,
    Varchar,
    Text,
    Date,
    DateTime,
    Timestamp,
    Bool,
    Enum,
}

impl DataType {
    pub const ALL: [DataType; 15] = [
        DataType::TinyInt,
        DataType::SmallInt,
        DataType::Int,
        DataType::BigInt,
        DataType::Float,
        DataType::Double,
        DataType::Decimal,
        DataType::Char,
        DataType::Varchar,
        DataType::Text,
        DataType::Date,
        DataType::DateTime,
        DataType::Timestamp,
        DataType::Bool,
        DataType::Enum,
    ];

    /// Type code used by the `.tdf` field block.
    pub fn code(&self) -> u8 {
        match self {
            DataType::TinyInt => 0,
            DataType::SmallInt => 1,
            DataType::Int => 2,
            DataType::BigInt => 3,
            DataType::Float => 4,
            DataType::Double => 5,
            DataType::Decimal => 6,
            DataType::Char => 7,
            DataType::Varchar => 8,
            DataType::Text => 9,
            DataType::Date => 10,
            DataType::DateTime => 11,
            DataType::Timestamp => 12,
            DataType::Bool => 13,
            DataType::Enum => 14,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        DataType::ALL.iter().copied().find(|data_type| data_type.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Decimal => "DECIMAL",
            DataType::Char => "CHAR",
            DataType::Varchar => "VARCHAR",
            DataType::Text => "TEXT",
            DataType::Date => "DATE",
            DataType::DateTime => "DATETIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Bool => "BOOL",
            DataType::Enum => "ENUM",
        }
    }

    /// Resolves a type name, accepting the common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "INTEGER" => Some(DataType::Int),
            "NUMERIC" => Some(DataType::Decimal),
            "BOOLEAN" => Some(DataType::Bool),
            "REAL" => Some(DataType::Double),
            _ => DataType::ALL
                .iter()
                .copied()
                .find(|data_type| data_type.name() == upper),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt | DataType::SmallInt | DataType::Int | DataType::BigInt
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double | DataType::Decimal)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            DataType::Char | DataType::Varchar | DataType::Text | DataType::Enum
        )
    }

    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            DataType::TinyInt => Some((i8::MIN as i64, i8::MAX as i64)),
            DataType::SmallInt => Some((i16::MIN as i64, i16::MAX as i64)),
            DataType::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            DataType::BigInt => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    PrimaryKey,
    NotNull,
    Unique,
    Size(u32),
    Precision(u32),
    Scale(u32),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::PrimaryKey => write!(f, "PRIMARY_KEY"),
            Constraint::NotNull => write!(f, "NOT_NULL"),
            Constraint::Unique => write!(f, "UNIQUE"),
            Constraint::Size(size) => write!(f, "SIZE({})", size),
            Constraint::Precision(precision) => write!(f, "PRECISION({})", precision),
            Constraint::Scale(scale) => write!(f, "SCALE({})", scale),
        }
    }
}

/// A column definition. Fields are never mutated once part of a table;
/// schema changes replace them.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<Constraint>,
    pub enum_values: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraints: vec![],
            enum_values: vec![],
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    pub fn with_enum_values(mut self, values: Vec<String>) -> Self {
        self.enum_values = values;
        self
    }

    /// Copy of this field under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Field {
        Field {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn without_constraint(mut self, constraint: &Constraint) -> Self {
        self.remove_constraint(constraint);
        self
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    pub fn remove_constraint(&mut self, constraint: &Constraint) {
        self.constraints.retain(|existing| existing != constraint);
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&Constraint::PrimaryKey)
    }

    pub fn is_not_null(&self) -> bool {
        self.constraints.contains(&Constraint::NotNull)
    }

    pub fn is_unique(&self) -> bool {
        self.constraints.contains(&Constraint::Unique)
    }

    pub fn size(&self) -> Option<u32> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::Size(size) => Some(*size),
            _ => None,
        })
    }

    pub fn precision(&self) -> Option<u32> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::Precision(precision) => Some(*precision),
            _ => None,
        })
    }

    pub fn scale(&self) -> Option<u32> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::Scale(scale) => Some(*scale),
            _ => None,
        })
    }

    /// Canonical type signature, the inverse of type-string parsing.
    pub fn typestring(&self) -> String {
        match self.data_type {
            DataType::Char | DataType::Varchar => match self.size() {
                Some(size) => format!("{}({})", self.data_type, size),
                None => self.data_type.to_string(),
            },
            DataType::Decimal => format!(
                "DECIMAL({},{})",
                self.precision().unwrap_or(0),
                self.scale().unwrap_or(0)
            ),
            DataType::Enum => {
                let values = self
                    .enum_values
                    .iter()
                    .map(|value| format!("'{}'", value.replace('\'', "''")))
                    .collect::<Vec<String>>();
                format!("ENUM({})", values.join(","))
            }
            _ => self.data_type.to_string(),
        }
    }

    /// Checks the declared parameters of the field itself.
    pub fn validate_definition(&self) -> Result<()> {
        if self.name.is_empty() || self.name.len() > MAX_NAME_BYTES {
            return Err(DbError::schema(format!(
                "Field name `{}` must be 1 to {} bytes",
                self.name, MAX_NAME_BYTES
            )));
        }
        match self.data_type {
            DataType::Decimal => {
                let precision = self.precision().unwrap_or(0);
                let scale = self.scale().unwrap_or(0);
                if precision == 0 || scale > precision {
                    return Err(DbError::schema(format!(
                        "Invalid DECIMAL({},{}) for field `{}`",
                        precision, scale, self.name
                    )));
                }
            }
            DataType::Char | DataType::Varchar => {
                if self.size() == Some(0) {
                    return Err(DbError::schema(format!(
                        "Size of field `{}` must be positive",
                        self.name
                    )));
                }
            }
            DataType::Enum => {
                if self.enum_values.is_empty() {
                    return Err(DbError::schema(format!(
                        "ENUM field `{}` has no values",
                        self.name
                    )));
                }
                // Stored comma-joined, so an empty member would not come back.
                if self.enum_values.iter().any(|value| value.is_empty()) {
                    return Err(DbError::schema(format!(
                        "ENUM values of field `{}` cannot be empty",
                        self.name
                    )));
                }
                if self.enum_values.iter().any(|value| value.contains(',')) {
                    return Err(DbError::schema(format!(
                        "ENUM values of field `{}` cannot contain commas",
                        self.name
                    )));
                }
                if self.enum_values.join(",").len() > MAX_ENUM_BYTES {
                    return Err(DbError::schema(format!(
                        "ENUM values of field `{}` exceed {} bytes",
                        self.name, MAX_ENUM_BYTES
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// True when `value` parses as the declared type. The empty string is
    /// valid only for string-like types.
    pub fn validate_type(&self, value: &str) -> bool {
        if value.is_empty() {
            return self.data_type.is_string_like();
        }
        match self.data_type {
            DataType::TinyInt | DataType::SmallInt | DataType::Int | DataType::BigInt => {
                match value.trim().parse::<i64>() {
                    Ok(number) => match self.data_type.integer_range() {
                        Some((min, max)) => number >= min && number <= max,
                        None => false,
                    },
                    Err(_) => false,
                }
            }
            DataType::Float | DataType::Double => value.trim().parse::<f64>().is_ok(),
            DataType::Decimal => split_decimal(value).is_some(),
            DataType::Bool => parse_bool(value).is_some(),
            DataType::Date => parse_date(value).is_some(),
            DataType::DateTime | DataType::Timestamp => parse_datetime(value).is_some(),
            DataType::Enum => self.enum_values.iter().any(|allowed| allowed == value),
            DataType::Char | DataType::Varchar | DataType::Text => true,
        }
    }

    /// Type conformance plus size and precision bounds.
    pub fn validate_value(&self, value: &str) -> Result<()> {
        if !self.validate_type(value) {
            return Err(DbError::Conversion(format!(
                "Value '{}' is not a valid {} for field `{}`",
                value,
                self.typestring(),
                self.name
            )));
        }
        match self.data_type {
            DataType::Char | DataType::Varchar => {
                let default_size = if self.data_type == DataType::Char {
                    DEFAULT_CHAR_SIZE
                } else {
                    DEFAULT_VARCHAR_SIZE
                };
                let size = self.size().unwrap_or(default_size) as usize;
                if value.chars().count() > size {
                    return Err(DbError::constraint(format!(
                        "Value for field `{}` exceeds {} characters",
                        self.name, size
                    )));
                }
            }
            DataType::Decimal => {
                if let (Some(precision), Some((integer_digits, fraction_digits))) =
                    (self.precision(), split_decimal(value))
                {
                    let scale = self.scale().unwrap_or(0);
                    if integer_digits > (precision - scale.min(precision)) as usize
                        || fraction_digits > scale as usize
                    {
                        return Err(DbError::constraint(format!(
                            "Value '{}' does not fit DECIMAL({},{}) for field `{}`",
                            value, precision, scale, self.name
                        )));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// Returns the count of significant integer digits and of fraction digits.
fn split_decimal(value: &str) -> Option<(usize, usize)> {
    let value = value.trim();
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (unsigned, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integer.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let significant = integer.trim_start_matches('0').len();
    Some((significant, fraction.len()))
}
