use crate::db::table::core::constraint::{CheckConstraint, ForeignKey, UniqueConstraint};
use crate::db::table::core::field::{Constraint, Field};
use crate::db::table::core::table::Table;
use crate::db::table::operations::helpers::validation::validate_record;
use crate::db::table::operations::insert::resolve_default;
use crate::error::{DbError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey { columns: Vec<String> },
    Unique(UniqueConstraint),
    Check(CheckConstraint),
    ForeignKey(ForeignKey),
}

impl TableConstraint {
    pub fn name(&self) -> Option<&str> {
        match self {
            TableConstraint::PrimaryKey { .. } => None,
            TableConstraint::Unique(unique) => Some(&unique.name),
            TableConstraint::Check(check) => Some(&check.name),
            TableConstraint::ForeignKey(foreign_key) => Some(&foreign_key.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddColumn { field: Field, default: Option<String> },
    DropColumn { name: String },
    ModifyColumn { field: Field, default: Option<String> },
    RenameTable { new_name: String },
    RenameColumn { old_name: String, new_name: String },
    AddConstraint(TableConstraint),
    DropConstraint { name: String },
    DropPrimaryKey,
}

/// Applies `action` to `table`. On error the table is left as it was.
/// Cross-table checks (new table name, referenced tables, indexes) belong to
/// the database.
pub fn alter_table(table: &mut Table, action: &AlterTableAction) -> Result<()> {
    let mut altered = table.clone();
    match action {
        AlterTableAction::AddColumn { field, default } => {
            add_column(&mut altered, field, default.as_deref())?;
        }
        AlterTableAction::DropColumn { name } => {
            altered.remove_field(name)?;
        }
        AlterTableAction::ModifyColumn { field, default } => {
            modify_column(&mut altered, field, default.as_deref())?;
        }
        AlterTableAction::RenameTable { new_name } => altered.rename(new_name.clone()),
        AlterTableAction::RenameColumn { old_name, new_name } => {
            rename_column(&mut altered, old_name, new_name)?;
        }
        AlterTableAction::AddConstraint(constraint) => {
            add_constraint(&mut altered, constraint.clone())?;
        }
        AlterTableAction::DropConstraint { name } => altered.remove_constraint(name)?,
        AlterTableAction::DropPrimaryKey => {
            if altered.primary_key.is_empty() {
                return Err(DbError::schema(format!(
                    "Table `{}` has no primary key",
                    altered.name
                )));
            }
            for column in std::mem::take(&mut altered.primary_key) {
                altered.replace_field(&column, |field| {
                    field.clone().without_constraint(&Constraint::PrimaryKey)
                })?;
            }
        }
    }
    validate_all(&altered)?;
    *table = altered;
    Ok(())
}

fn add_column(table: &mut Table, field: &Field, default: Option<&str>) -> Result<()> {
    let value = default.and_then(resolve_default);
    if value.is_none() && (field.is_not_null() || field.is_primary_key()) && !table.is_empty() {
        return Err(DbError::constraint(format!(
            "Cannot add NOT NULL field `{}` without a default to non-empty table `{}`",
            field.name, table.name
        )));
    }
    table.add_field(field.clone())?;
    if let Some(default) = default {
        table.defaults.insert(field.name.clone(), default.to_string());
    }
    for record in table.records_mut().iter_mut() {
        record.insert(field.name.clone(), value.clone());
    }
    Ok(())
}

fn modify_column(table: &mut Table, field: &Field, default: Option<&str>) -> Result<()> {
    field.validate_definition()?;
    let name = table.canonical_field_name(&field.name)?;
    table.replace_field(&name, |_| field.renamed(name.as_str()))?;

    let is_key = field.is_primary_key();
    if is_key && !table.primary_key.contains(&name) {
        table.primary_key.push(name.clone());
    } else if !is_key {
        table.primary_key.retain(|column| column != &name);
    }
    match default {
        Some(default) => {
            table.defaults.insert(name, default.to_string());
        }
        None => {
            table.defaults.remove(&name);
        }
    }
    Ok(())
}

fn rename_column(table: &mut Table, old_name: &str, new_name: &str) -> Result<()> {
    let old = table.canonical_field_name(old_name)?;
    if table
        .field(new_name)
        .is_some_and(|existing| !existing.name.eq_ignore_ascii_case(&old))
    {
        return Err(DbError::schema(format!(
            "Field `{}` already exists in table `{}`",
            new_name, table.name
        )));
    }
    let renamed = |column: &mut String| {
        if *column == old {
            *column = new_name.to_string();
        }
    };
    table.replace_field(&old, |field| field.renamed(new_name))?;
    table.primary_key.iter_mut().for_each(renamed);
    for unique in table.unique_constraints.iter_mut() {
        unique.columns.iter_mut().for_each(renamed);
    }
    for foreign_key in table.foreign_keys.iter_mut() {
        foreign_key.columns.iter_mut().for_each(renamed);
    }
    for check in table.check_constraints.iter_mut() {
        check.condition.rename_column(&old, new_name);
    }
    if let Some(default) = table.defaults.remove(&old) {
        table.defaults.insert(new_name.to_string(), default);
    }
    for record in table.records_mut().iter_mut() {
        record.rename_value(&old, new_name);
    }
    Ok(())
}

fn add_constraint(table: &mut Table, constraint: TableConstraint) -> Result<()> {
    match constraint {
        TableConstraint::PrimaryKey { columns } => {
            if !table.primary_key.is_empty() {
                return Err(DbError::schema(format!(
                    "Table `{}` already has a primary key",
                    table.name
                )));
            }
            let columns = table.canonical_columns(&columns)?;
            for column in &columns {
                table.replace_field(column, |field| {
                    field.clone().with_constraint(Constraint::PrimaryKey)
                })?;
            }
            table.primary_key = columns;
            Ok(())
        }
        TableConstraint::Unique(unique) => table.add_unique_constraint(unique),
        TableConstraint::Check(check) => table.add_check_constraint(check),
        TableConstraint::ForeignKey(foreign_key) => table.add_foreign_key(foreign_key),
    }
}

/// Revalidates every visible record against the current schema.
pub fn validate_all(table: &Table) -> Result<()> {
    for (index, record) in table.records().iter().enumerate() {
        validate_record(table, record, Some(index))?;
    }
    Ok(())
}
