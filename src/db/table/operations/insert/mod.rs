use chrono::Local;

use crate::db::table::core::condition::unescape_literal;
use crate::db::table::core::record::Record;
use crate::db::table::core::table::Table;
use crate::db::table::core::value::{DATETIME_FORMAT, DATE_FORMAT};
use crate::db::table::operations::helpers::validation::validate_record;
use crate::error::{DbError, Result};

/// Inserts one row. Fields not named in `values` take their default, or NULL.
pub fn insert_data(table: &mut Table, values: &[(String, Option<String>)]) -> Result<()> {
    let mut record = Record::new();
    for (column, value) in values {
        let canonical = table.canonical_field_name(column)?;
        if record.has_value(&canonical) {
            return Err(DbError::schema(format!(
                "Field `{}` is given more than once",
                canonical
            )));
        }
        record.insert(canonical, value.clone());
    }
    for field in &table.fields {
        if record.has_value(&field.name) {
            continue;
        }
        let default = table
            .defaults
            .get(&field.name)
            .and_then(|expression| resolve_default(expression));
        record.insert(field.name.clone(), default);
    }

    validate_record(table, &record, None)?;
    table.records_mut().push(record);
    Ok(())
}

/// Evaluates a stored DEFAULT expression.
pub fn resolve_default(expression: &str) -> Option<String> {
    let trimmed = expression.trim();
    if trimmed.eq_ignore_ascii_case("NULL") {
        return None;
    }
    if trimmed.eq_ignore_ascii_case("CURRENT_TIMESTAMP") {
        return Some(Local::now().format(DATETIME_FORMAT).to_string());
    }
    if trimmed.eq_ignore_ascii_case("CURRENT_DATE") {
        return Some(Local::now().format(DATE_FORMAT).to_string());
    }
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return Some(unescape_literal(&trimmed[1..trimmed.len() - 1]));
    }
    Some(trimmed.to_string())
}
