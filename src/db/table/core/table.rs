use std::collections::BTreeMap;

use tracing::warn;

use crate::db::table::core::constraint::{CheckConstraint, ForeignKey, UniqueConstraint};
use crate::db::table::core::field::{Constraint, Field};
use crate::db::table::core::record::Record;
use crate::db::transactions::Staged;
use crate::error::{DbError, Result};

/// Schema half of a table, as produced by CREATE TABLE or the `.tdf` reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableDefinition {
    pub fields: Vec<Field>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub check_constraints: Vec<CheckConstraint>,
    /// Field name to default expression (`NULL`, `CURRENT_DATE`, a literal).
    pub defaults: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    /// Owning database, by name.
    pub database: String,
    pub fields: Vec<Field>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub check_constraints: Vec<CheckConstraint>,
    pub defaults: BTreeMap<String, String>,
    records: Staged<Vec<Record>>,
}

impl Table {
    pub fn new(name: impl Into<String>, database: impl Into<String>, fields: Vec<Field>) -> Self {
        let primary_key = fields
            .iter()
            .filter(|field| field.is_primary_key())
            .map(|field| field.name.clone())
            .collect();
        Self {
            name: name.into(),
            database: database.into(),
            fields,
            primary_key,
            foreign_keys: vec![],
            unique_constraints: vec![],
            check_constraints: vec![],
            defaults: BTreeMap::new(),
            records: Staged::new(vec![]),
        }
    }

    /// Builds a table and checks that the definition is self-consistent.
    pub fn from_definition(
        name: impl Into<String>,
        database: impl Into<String>,
        definition: TableDefinition,
    ) -> Result<Self> {
        let mut table = Table::new(name, database, definition.fields);
        if table.fields.is_empty() {
            return Err(DbError::schema(format!("Table `{}` has no fields", table.name)));
        }
        for (index, field) in table.fields.iter().enumerate() {
            field.validate_definition()?;
            if table.fields[..index].iter().any(|other| other.matches_name(&field.name)) {
                return Err(DbError::schema(format!(
                    "Duplicate field `{}` in table `{}`",
                    field.name, table.name
                )));
            }
        }
        for column in &definition.primary_key {
            let canonical = table.canonical_field_name(column)?;
            if !table.primary_key.contains(&canonical) {
                table.primary_key.push(canonical.clone());
            }
            table.replace_field(&canonical, |field| {
                field.clone().with_constraint(Constraint::PrimaryKey)
            })?;
        }
        for foreign_key in definition.foreign_keys {
            table.add_foreign_key(foreign_key)?;
        }
        for unique in definition.unique_constraints {
            table.add_unique_constraint(unique)?;
        }
        for check in definition.check_constraints {
            table.add_check_constraint(check)?;
        }
        for (column, expression) in definition.defaults {
            let canonical = table.canonical_field_name(&column)?;
            table.defaults.insert(canonical, expression);
        }
        Ok(table)
    }

    pub fn definition(&self) -> TableDefinition {
        TableDefinition {
            fields: self.fields.clone(),
            primary_key: self.primary_key.clone(),
            foreign_keys: self.foreign_keys.clone(),
            unique_constraints: self.unique_constraints.clone(),
            check_constraints: self.check_constraints.clone(),
            defaults: self.defaults.clone(),
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.matches_name(name))
    }

    /// Swaps the named field for the one `rebuild` derives from it and returns
    /// the old field. Fields are replaced, never edited in place.
    pub fn replace_field(
        &mut self,
        name: &str,
        rebuild: impl FnOnce(&Field) -> Field,
    ) -> Result<Field> {
        let index = self.field_index(name).ok_or_else(|| {
            DbError::schema(format!(
                "Field `{}` does not exist in table `{}`",
                name, self.name
            ))
        })?;
        let replacement = rebuild(&self.fields[index]);
        Ok(std::mem::replace(&mut self.fields[index], replacement))
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.matches_name(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Resolves `name`, optionally qualified as `table.name`.
    pub fn resolve_field(&self, name: &str) -> Result<&Field> {
        let unqualified = match name.split_once('.') {
            Some((qualifier, column)) if self.matches_name(qualifier) => column,
            _ => name,
        };
        self.field(unqualified).ok_or_else(|| {
            DbError::schema(format!(
                "Field `{}` does not exist in table `{}`",
                name, self.name
            ))
        })
    }

    pub fn canonical_field_name(&self, name: &str) -> Result<String> {
        Ok(self.resolve_field(name)?.name.clone())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// Records visible to statements: the snapshot inside a transaction.
    pub fn records(&self) -> &Vec<Record> {
        self.records.visible()
    }

    pub fn records_mut(&mut self) -> &mut Vec<Record> {
        self.records.visible_mut()
    }

    pub fn committed_records(&self) -> &Vec<Record> {
        self.records.committed()
    }

    pub fn set_records(&mut self, records: Vec<Record>) {
        *self.records.visible_mut() = records;
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn in_transaction(&self) -> bool {
        self.records.in_transaction()
    }

    pub fn begin_transaction(&mut self) {
        if !self.records.begin() {
            warn!(table = %self.name, "transaction already active on table");
        }
    }

    pub fn commit_transaction(&mut self) {
        self.records.commit();
    }

    pub fn rollback_transaction(&mut self) {
        self.records.rollback();
    }

    pub fn add_field(&mut self, field: Field) -> Result<()> {
        field.validate_definition()?;
        if self.has_field(&field.name) {
            return Err(DbError::schema(format!(
                "Field `{}` already exists in table `{}`",
                field.name, self.name
            )));
        }
        if field.is_primary_key() {
            self.primary_key.push(field.name.clone());
        }
        self.fields.push(field);
        Ok(())
    }

    /// Removes the field from the schema and from every visible record.
    pub fn remove_field(&mut self, name: &str) -> Result<Field> {
        let index = self.field_index(name).ok_or_else(|| {
            DbError::schema(format!(
                "Field `{}` does not exist in table `{}`",
                name, self.name
            ))
        })?;
        if self.fields.len() == 1 {
            return Err(DbError::schema(format!(
                "Cannot remove the only field of table `{}`",
                self.name
            )));
        }
        let field = self.fields.remove(index);
        self.primary_key.retain(|column| column != &field.name);
        self.defaults.remove(&field.name);
        self.unique_constraints
            .retain(|unique| !unique.columns.contains(&field.name));
        self.foreign_keys
            .retain(|foreign_key| !foreign_key.columns.contains(&field.name));
        self.check_constraints.retain(|check| {
            !check
                .condition
                .columns()
                .iter()
                .any(|column| column.eq_ignore_ascii_case(&field.name))
        });
        for record in self.records.visible_mut().iter_mut() {
            record.remove_value(&field.name);
        }
        Ok(field)
    }

    pub fn rename(&mut self, new_name: impl Into<String>) {
        self.name = new_name.into();
    }

    pub fn add_foreign_key(&mut self, mut foreign_key: ForeignKey) -> Result<()> {
        self.ensure_constraint_name_free(&foreign_key.name)?;
        if foreign_key.columns.len() != foreign_key.referenced_columns.len() {
            return Err(DbError::schema(format!(
                "Foreign key `{}` maps {} columns to {}",
                foreign_key.name,
                foreign_key.columns.len(),
                foreign_key.referenced_columns.len()
            )));
        }
        foreign_key.columns = self.canonical_columns(&foreign_key.columns)?;
        self.foreign_keys.push(foreign_key);
        Ok(())
    }

    pub fn add_unique_constraint(&mut self, mut unique: UniqueConstraint) -> Result<()> {
        self.ensure_constraint_name_free(&unique.name)?;
        unique.columns = self.canonical_columns(&unique.columns)?;
        self.unique_constraints.push(unique);
        Ok(())
    }

    pub fn add_check_constraint(&mut self, check: CheckConstraint) -> Result<()> {
        self.ensure_constraint_name_free(&check.name)?;
        for column in check.condition.columns() {
            self.canonical_field_name(column)?;
        }
        self.check_constraints.push(check);
        Ok(())
    }

    /// Drops a named table-level constraint of any kind.
    pub fn remove_constraint(&mut self, name: &str) -> Result<()> {
        let before = self.foreign_keys.len()
            + self.unique_constraints.len()
            + self.check_constraints.len();
        self.foreign_keys
            .retain(|foreign_key| !foreign_key.name.eq_ignore_ascii_case(name));
        self.unique_constraints
            .retain(|unique| !unique.name.eq_ignore_ascii_case(name));
        self.check_constraints
            .retain(|check| !check.name.eq_ignore_ascii_case(name));
        let after = self.foreign_keys.len()
            + self.unique_constraints.len()
            + self.check_constraints.len();
        if before == after {
            return Err(DbError::schema(format!(
                "Constraint `{}` does not exist on table `{}`",
                name, self.name
            )));
        }
        Ok(())
    }

    pub fn has_constraint(&self, name: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|foreign_key| foreign_key.name.eq_ignore_ascii_case(name))
            || self
                .unique_constraints
                .iter()
                .any(|unique| unique.name.eq_ignore_ascii_case(name))
            || self
                .check_constraints
                .iter()
                .any(|check| check.name.eq_ignore_ascii_case(name))
    }

    fn ensure_constraint_name_free(&self, name: &str) -> Result<()> {
        if self.has_constraint(name) {
            return Err(DbError::schema(format!(
                "Constraint `{}` already exists on table `{}`",
                name, self.name
            )));
        }
        Ok(())
    }

    pub fn canonical_columns(&self, columns: &[String]) -> Result<Vec<String>> {
        columns
            .iter()
            .map(|column| self.canonical_field_name(column))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::core::condition::{ComparisonOperator, Condition, Operand};
    use crate::db::table::core::field::DataType;
    use crate::db::table::test_utils::default_table;

    #[test]
    fn primary_key_is_taken_from_field_constraints() {
        let table = default_table();
        assert_eq!(table.primary_key, vec!["id".to_string()]);
        assert_eq!(table.canonical_field_name("NAME").unwrap(), "name");
        assert_eq!(table.canonical_field_name("users.age").unwrap(), "age");
        assert!(table.canonical_field_name("missing").is_err());
    }

    #[test]
    fn from_definition_rejects_duplicate_fields() {
        let definition = TableDefinition {
            fields: vec![
                Field::new("id", DataType::Int),
                Field::new("ID", DataType::Text),
            ],
            ..TableDefinition::default()
        };
        assert!(matches!(
            Table::from_definition("t", "db", definition),
            Err(DbError::Schema(_))
        ));
    }

    #[test]
    fn replace_field_returns_the_old_field() {
        let mut table = default_table();
        let old = table
            .replace_field("AGE", |field| field.renamed("years"))
            .unwrap();
        assert_eq!(old.name, "age");
        assert_eq!(table.field_names(), vec!["id", "name", "years", "money"]);
        assert!(matches!(
            table.replace_field("missing", Field::clone),
            Err(DbError::Schema(_))
        ));
    }

    #[test]
    fn remove_field_strips_records_and_primary_key() {
        let mut table = default_table();
        table.remove_field("id").unwrap();
        assert!(table.primary_key.is_empty());
        assert!(table.records().iter().all(|record| !record.has_value("id")));
        assert_eq!(table.field_names(), vec!["name", "age", "money"]);
    }

    #[test]
    fn remove_field_drops_dependent_constraints() {
        let mut table = default_table();
        table
            .add_check_constraint(CheckConstraint {
                name: "adult".to_string(),
                condition: Condition::compare(
                    "age",
                    ComparisonOperator::GreaterEquals,
                    vec![Operand::Number("18".to_string())],
                ),
            })
            .unwrap();
        table
            .add_unique_constraint(UniqueConstraint {
                name: "uq_age".to_string(),
                columns: vec!["AGE".to_string()],
            })
            .unwrap();
        assert_eq!(table.unique_constraints[0].columns, vec!["age".to_string()]);
        table.remove_field("age").unwrap();
        assert!(table.check_constraints.is_empty());
        assert!(table.unique_constraints.is_empty());
    }

    #[test]
    fn transaction_snapshot_is_discarded_on_rollback() {
        let mut table = default_table();
        let before = table.records().clone();
        table.begin_transaction();
        assert!(table.in_transaction());
        table.records_mut().clear();
        assert_eq!(table.committed_records(), &before);
        table.rollback_transaction();
        assert!(!table.in_transaction());
        assert_eq!(table.records(), &before);
    }

    #[test]
    fn constraint_names_are_unique_per_table() {
        let mut table = default_table();
        let unique = UniqueConstraint {
            name: "uq".to_string(),
            columns: vec!["name".to_string()],
        };
        table.add_unique_constraint(unique.clone()).unwrap();
        assert!(table.add_unique_constraint(unique).is_err());
        table.remove_constraint("UQ").unwrap();
        assert!(table.remove_constraint("uq").is_err());
    }
}
