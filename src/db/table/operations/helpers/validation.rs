use crate::db::table::core::record::Record;
use crate::db::table::core::table::Table;
use crate::db::table::core::value::Value;
use crate::db::table::operations::helpers::where_clause::{evaluate, TableRow};
use crate::error::{DbError, Result};

/// Checks `record` against every field and table constraint. `skip` is the
/// index of the visible record being replaced, excluded from uniqueness checks.
pub fn validate_record(table: &Table, record: &Record, skip: Option<usize>) -> Result<()> {
    for field in &table.fields {
        match record.value(&field.name) {
            None if field.is_not_null() || field.is_primary_key() => {
                return Err(DbError::constraint(format!(
                    "Field `{}` cannot be NULL",
                    field.name
                )));
            }
            None => {}
            Some(value) => field.validate_value(value)?,
        }
    }

    if !table.primary_key.is_empty() && conflicts(table, record, &table.primary_key, skip) {
        return Err(DbError::constraint(format!(
            "Duplicate primary key ({}) in table `{}`",
            key_text(record, &table.primary_key),
            table.name
        )));
    }

    for field in table.fields.iter().filter(|field| field.is_unique()) {
        let columns = [field.name.clone()];
        if conflicts(table, record, &columns, skip) {
            return Err(DbError::constraint(format!(
                "Duplicate value ({}) for UNIQUE field `{}`",
                key_text(record, &columns),
                field.name
            )));
        }
    }

    for unique in &table.unique_constraints {
        if conflicts(table, record, &unique.columns, skip) {
            return Err(DbError::constraint(format!(
                "Duplicate value ({}) violates UNIQUE constraint `{}`",
                key_text(record, &unique.columns),
                unique.name
            )));
        }
    }

    for check in &table.check_constraints {
        // A NULL operand leaves the check unknown, which passes.
        let touches_null = check.condition.columns().iter().any(|column| {
            table
                .field(column)
                .is_some_and(|field| record.value(&field.name).is_none())
        });
        if touches_null {
            continue;
        }
        if !evaluate(&check.condition, &TableRow { table, record })? {
            return Err(DbError::constraint(format!(
                "CHECK constraint `{}` failed on table `{}`",
                check.name, table.name
            )));
        }
    }
    Ok(())
}

/// True when another visible record holds the same non-NULL tuple for `columns`.
pub fn conflicts(table: &Table, record: &Record, columns: &[String], skip: Option<usize>) -> bool {
    let key = match typed_key(table, record, columns) {
        Some(key) => key,
        None => return false,
    };
    table
        .records()
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != skip)
        .any(|(_, other)| typed_key(table, other, columns).is_some_and(|other| other == key))
}

fn typed_key(table: &Table, record: &Record, columns: &[String]) -> Option<Vec<Value>> {
    columns
        .iter()
        .map(|column| {
            let data_type = table.field(column)?.data_type;
            let value = Value::convert(record.value(column), data_type);
            if value.is_null() { None } else { Some(value) }
        })
        .collect()
}

fn key_text(record: &Record, columns: &[String]) -> String {
    columns
        .iter()
        .map(|column| record.value(column).unwrap_or("NULL"))
        .collect::<Vec<&str>>()
        .join(", ")
}
