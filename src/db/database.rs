use tracing::{debug, info};

use crate::db::index::Index;
use crate::db::table::core::condition::Condition;
use crate::db::table::core::constraint::{ForeignKey, UniqueConstraint};
use crate::db::table::core::table::{Table, TableDefinition};
use crate::db::table::operations::alter_table::{self, AlterTableAction, TableConstraint};
use crate::db::table::operations::select::{self, explain, ResultSet, SelectQuery};
use crate::db::table::operations::update::{self, Assignment, UpdateOutcome};
use crate::db::table::operations::{delete, insert};
use crate::db::transactions::Staged;
use crate::error::{DbError, Result};
use crate::storage;

/// A named set of tables plus their index metadata.
///
/// BEGIN snapshots both lists and starts a transaction on every table, so
/// DDL issued inside the transaction is undone by ROLLBACK along with the data.
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub name: String,
    tables: Staged<Vec<Table>>,
    indexes: Staged<Vec<Index>>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name, vec![], vec![])
    }

    pub fn from_parts(name: impl Into<String>, tables: Vec<Table>, indexes: Vec<Index>) -> Self {
        Self {
            name: name.into(),
            tables: Staged::new(tables),
            indexes: Staged::new(indexes),
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn tables(&self) -> &Vec<Table> {
        self.tables.visible()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables().iter().any(|table| table.matches_name(name))
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables()
            .iter()
            .find(|table| table.matches_name(name))
            .ok_or_else(|| self.missing_table(name))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        let error = self.missing_table(name);
        self.tables
            .visible_mut()
            .iter_mut()
            .find(|table| table.matches_name(name))
            .ok_or(error)
    }

    fn missing_table(&self, name: &str) -> DbError {
        DbError::schema(format!(
            "Table `{}` does not exist in database `{}`",
            name, self.name
        ))
    }

    pub fn create_table(&mut self, name: &str, definition: TableDefinition) -> Result<()> {
        storage::validate_name("table", name)?;
        if self.has_table(name) {
            return Err(DbError::schema(format!(
                "Table `{}` already exists in database `{}`",
                name, self.name
            )));
        }
        for foreign_key in &definition.foreign_keys {
            self.check_reference(name, &definition, foreign_key)?;
        }
        let mut table = Table::from_definition(name, self.name.clone(), definition)?;
        if self.in_transaction() {
            table.begin_transaction();
        }
        self.tables.visible_mut().push(table);
        info!(database = %self.name, table = name, "created table");
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<Table> {
        let position = self
            .tables()
            .iter()
            .position(|table| table.matches_name(name))
            .ok_or_else(|| self.missing_table(name))?;
        let table = self.tables.visible_mut().remove(position);
        self.indexes
            .visible_mut()
            .retain(|index| !index.belongs_to(&table.name));
        info!(database = %self.name, table = %table.name, "dropped table");
        Ok(table)
    }

    pub fn alter_table(&mut self, name: &str, action: &AlterTableAction) -> Result<()> {
        let current = self.table(name)?.name.clone();
        match action {
            AlterTableAction::RenameTable { new_name } => {
                storage::validate_name("table", new_name)?;
                if !current.eq_ignore_ascii_case(new_name) && self.has_table(new_name) {
                    return Err(DbError::schema(format!(
                        "Table `{}` already exists in database `{}`",
                        new_name, self.name
                    )));
                }
            }
            AlterTableAction::AddConstraint(TableConstraint::ForeignKey(foreign_key)) => {
                let definition = self.table(&current)?.definition();
                self.check_reference(&current, &definition, foreign_key)?;
            }
            _ => {}
        }

        alter_table::alter_table(self.table_mut(&current)?, action)?;

        let indexes = self.indexes.visible_mut();
        match action {
            AlterTableAction::RenameTable { new_name } => {
                for index in indexes.iter_mut().filter(|index| index.belongs_to(&current)) {
                    index.table = new_name.clone();
                }
            }
            AlterTableAction::RenameColumn { old_name, new_name } => {
                for index in indexes.iter_mut().filter(|index| index.belongs_to(&current)) {
                    index.rename_column(old_name, new_name);
                }
            }
            AlterTableAction::DropColumn { name: column } => {
                indexes.retain(|index| !(index.belongs_to(&current) && index.covers(column)));
            }
            AlterTableAction::DropConstraint { name: constraint } => {
                indexes.retain(|index| {
                    !(index.unique && index.belongs_to(&current) && index.matches_name(constraint))
                });
            }
            _ => {}
        }
        debug!(database = %self.name, table = %current, ?action, "altered table");
        Ok(())
    }

    // A foreign key must name an existing table (possibly the one being
    // defined) and existing columns in it.
    fn check_reference(
        &self,
        table_name: &str,
        definition: &TableDefinition,
        foreign_key: &ForeignKey,
    ) -> Result<()> {
        let referenced_fields = if foreign_key.referenced_table.eq_ignore_ascii_case(table_name) {
            definition.fields.clone()
        } else {
            self.table(&foreign_key.referenced_table)
                .map_err(|_| {
                    DbError::schema(format!(
                        "Foreign key `{}` references missing table `{}`",
                        foreign_key.name, foreign_key.referenced_table
                    ))
                })?
                .fields
                .clone()
        };
        for column in &foreign_key.referenced_columns {
            if !referenced_fields.iter().any(|field| field.matches_name(column)) {
                return Err(DbError::schema(format!(
                    "Foreign key `{}` references missing field `{}.{}`",
                    foreign_key.name, foreign_key.referenced_table, column
                )));
            }
        }
        Ok(())
    }

    pub fn indexes(&self) -> &Vec<Index> {
        self.indexes.visible()
    }

    pub fn indexes_for(&self, table: &str) -> Vec<&Index> {
        self.indexes()
            .iter()
            .filter(|index| index.belongs_to(table))
            .collect()
    }

    /// Registers an index. A unique index also becomes a UNIQUE constraint of
    /// the same name, checked against the existing rows first.
    pub fn create_index(
        &mut self,
        name: &str,
        table_name: &str,
        columns: &[String],
        unique: bool,
    ) -> Result<()> {
        if self.indexes().iter().any(|index| index.matches_name(name)) {
            return Err(DbError::schema(format!(
                "Index `{}` already exists in database `{}`",
                name, self.name
            )));
        }
        if columns.is_empty() {
            return Err(DbError::schema(format!("Index `{}` has no columns", name)));
        }
        let table = self.table_mut(table_name)?;
        let columns = table.canonical_columns(columns)?;
        if unique {
            let constraint = TableConstraint::Unique(UniqueConstraint {
                name: name.to_string(),
                columns: columns.clone(),
            });
            alter_table::alter_table(table, &AlterTableAction::AddConstraint(constraint))?;
        }
        let index = Index {
            name: name.to_string(),
            table: table.name.clone(),
            columns,
            unique,
        };
        self.indexes.visible_mut().push(index);
        info!(database = %self.name, index = name, "created index");
        Ok(())
    }

    pub fn drop_index(&mut self, name: &str) -> Result<Index> {
        let position = self
            .indexes()
            .iter()
            .position(|index| index.matches_name(name))
            .ok_or_else(|| {
                DbError::schema(format!(
                    "Index `{}` does not exist in database `{}`",
                    name, self.name
                ))
            })?;
        let index = self.indexes.visible_mut().remove(position);
        if index.unique {
            if let Ok(table) = self.table_mut(&index.table) {
                if table.has_constraint(&index.name) {
                    table.remove_constraint(&index.name)?;
                }
            }
        }
        info!(database = %self.name, index = %index.name, "dropped index");
        Ok(index)
    }

    pub fn insert_data(&mut self, table: &str, values: &[(String, Option<String>)]) -> Result<()> {
        insert::insert_data(self.table_mut(table)?, values)
    }

    pub fn update_data(
        &mut self,
        table: &str,
        assignments: &[Assignment],
        condition: &Condition,
    ) -> Result<UpdateOutcome> {
        update::update_data(self.table_mut(table)?, assignments, condition)
    }

    pub fn delete_data(&mut self, table: &str, condition: &Condition) -> Result<usize> {
        delete::delete_data(self.table_mut(table)?, condition)
    }

    pub fn select(&self, query: &SelectQuery) -> Result<ResultSet> {
        let table = self.table(&query.table.name)?;
        let joined = match &query.join {
            Some(join) => Some(self.table(&join.table.name)?),
            None => None,
        };
        select::select(query, table, joined)
    }

    pub fn explain(&self, query: &SelectQuery) -> Result<ResultSet> {
        self.table(&query.table.name)?;
        if let Some(join) = &query.join {
            self.table(&join.table.name)?;
        }
        Ok(explain::explain(query, self.indexes()))
    }

    pub fn in_transaction(&self) -> bool {
        self.tables.in_transaction()
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        if !self.tables.begin() {
            return Err(DbError::transaction(format!(
                "Database `{}` is already in a transaction",
                self.name
            )));
        }
        self.indexes.begin();
        for table in self.tables.visible_mut().iter_mut() {
            table.begin_transaction();
        }
        debug!(database = %self.name, "began transaction");
        Ok(())
    }

    pub fn commit_transaction(&mut self) -> Result<()> {
        if !self.tables.commit() {
            return Err(self.no_transaction());
        }
        self.indexes.commit();
        for table in self.tables.visible_mut().iter_mut() {
            table.commit_transaction();
        }
        debug!(database = %self.name, "committed transaction");
        Ok(())
    }

    /// Restores the table list as it was at BEGIN. Those tables never saw
    /// the transaction, so their committed records are authoritative again.
    pub fn rollback_transaction(&mut self) -> Result<()> {
        if !self.tables.rollback() {
            return Err(self.no_transaction());
        }
        self.indexes.rollback();
        debug!(database = %self.name, "rolled back transaction");
        Ok(())
    }

    fn no_transaction(&self) -> DbError {
        DbError::transaction(format!(
            "Database `{}` has no active transaction",
            self.name
        ))
    }
}
