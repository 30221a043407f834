use tracing::{debug, error, info, warn};

use crate::db::manager::Manager;
use crate::db::table::operations::select::ResultSet;
use crate::error::{DbError, Result};
use crate::interpreter::ast::{ExistenceCheck, InsertIntoStatement, SqlStatement};
use crate::interpreter::auth::{AllowAll, Authorizer, Role};

/// What a statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    Done,
    Affected(usize),
    Rows(ResultSet),
}

/// One user's connection to the engine: the manager plus who is asking.
pub struct Session {
    manager: Manager,
    user: String,
    authorizer: Box<dyn Authorizer>,
}

impl Session {
    /// A session with every permission.
    pub fn new(manager: Manager) -> Self {
        Self::with_authorizer(manager, "root", Box::new(AllowAll))
    }

    pub fn with_authorizer(manager: Manager, user: impl Into<String>, authorizer: Box<dyn Authorizer>) -> Self {
        Self {
            manager,
            user: user.into(),
            authorizer,
        }
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn execute(&mut self, statement: SqlStatement) -> Result<StatementOutcome> {
        self.authorize(&statement)?;
        match statement {
            SqlStatement::CreateDatabase(create) => {
                let if_not_exists = create.existence_check == Some(ExistenceCheck::IfNotExists);
                if !self.manager.create_database(&create.name, if_not_exists)? {
                    info!(database = %create.name, "database exists, CREATE skipped");
                }
                Ok(StatementOutcome::Done)
            }
            SqlStatement::DropDatabase(drop) => {
                let if_exists = drop.existence_check == Some(ExistenceCheck::IfExists);
                if !self.manager.drop_database(&drop.name, if_exists)? {
                    info!(database = %drop.name, "database missing, DROP skipped");
                }
                Ok(StatementOutcome::Done)
            }
            SqlStatement::UseDatabase(name) => {
                self.manager.use_database(&name)?;
                Ok(StatementOutcome::Done)
            }
            SqlStatement::ShowDatabases => Ok(StatementOutcome::Rows(self.manager.show_databases())),
            SqlStatement::ShowTables => Ok(StatementOutcome::Rows(self.manager.show_tables()?)),
            SqlStatement::ShowIndexes(table) => {
                Ok(StatementOutcome::Rows(self.manager.show_indexes(table.as_deref())?))
            }
            SqlStatement::Describe(table) => Ok(StatementOutcome::Rows(self.manager.describe(&table)?)),
            SqlStatement::CreateTable(create) => {
                let if_not_exists = create.existence_check == Some(ExistenceCheck::IfNotExists);
                if !self
                    .manager
                    .create_table(&create.table_name, create.definition, if_not_exists)?
                {
                    info!(table = %create.table_name, "table exists, CREATE skipped");
                }
                Ok(StatementOutcome::Done)
            }
            SqlStatement::DropTable(drop) => {
                let if_exists = drop.existence_check == Some(ExistenceCheck::IfExists);
                if !self.manager.drop_table(&drop.table_name, if_exists)? {
                    info!(table = %drop.table_name, "table missing, DROP skipped");
                }
                Ok(StatementOutcome::Done)
            }
            SqlStatement::AlterTable(alter) => {
                self.manager.alter_table(&alter.table_name, &alter.action)?;
                Ok(StatementOutcome::Done)
            }
            SqlStatement::CreateIndex(create) => {
                self.manager
                    .create_index(&create.index_name, &create.table_name, &create.columns, create.unique)?;
                Ok(StatementOutcome::Done)
            }
            SqlStatement::DropIndex(name) => {
                self.manager.drop_index(&name)?;
                Ok(StatementOutcome::Done)
            }
            SqlStatement::InsertInto(insert) => self.insert(insert),
            SqlStatement::Update(update) => {
                let table = update.table_name;
                let (assignments, condition) = (update.assignments, update.condition);
                self.in_statement_transaction(|manager| {
                    let outcome = manager.update_data(&table, &assignments, &condition)?;
                    Ok((outcome.updated, outcome.failures.into_iter().next()))
                })
            }
            SqlStatement::Delete(delete) => {
                let deleted = self.manager.delete_data(&delete.table_name, &delete.condition)?;
                Ok(StatementOutcome::Affected(deleted))
            }
            SqlStatement::Select(query) => Ok(StatementOutcome::Rows(self.manager.select(&query)?)),
            SqlStatement::Explain(query) => Ok(StatementOutcome::Rows(self.manager.explain(&query)?)),
            SqlStatement::BeginTransaction => {
                self.manager.begin_transaction()?;
                Ok(StatementOutcome::Done)
            }
            SqlStatement::Commit => {
                self.manager.commit_transaction()?;
                Ok(StatementOutcome::Done)
            }
            SqlStatement::Rollback => {
                self.manager.rollback_transaction()?;
                Ok(StatementOutcome::Done)
            }
        }
    }

    fn authorize(&self, statement: &SqlStatement) -> Result<()> {
        if statement.is_read_only() {
            return Ok(());
        }
        let (database, required) = match statement {
            SqlStatement::BeginTransaction | SqlStatement::Commit | SqlStatement::Rollback => return Ok(()),
            SqlStatement::CreateDatabase(target) | SqlStatement::DropDatabase(target) => {
                (target.name.clone(), Role::Admin)
            }
            SqlStatement::CreateIndex(_) | SqlStatement::DropIndex(_) => (self.current_database_name()?, Role::Admin),
            _ => (self.current_database_name()?, Role::ReadWrite),
        };
        if self.authorizer.has_role(&self.user, &database, required) {
            return Ok(());
        }
        warn!(user = %self.user, database = %database, required = %required, "statement rejected");
        Err(DbError::Permission(format!(
            "user `{}` needs {} access on database `{}`",
            self.user, required, database
        )))
    }

    fn current_database_name(&self) -> Result<String> {
        self.manager
            .current_database_name()
            .map(|name| name.to_string())
            .ok_or_else(|| DbError::schema("No database selected"))
    }

    fn insert(&mut self, insert: InsertIntoStatement) -> Result<StatementOutcome> {
        let columns = match insert.columns {
            Some(columns) => columns,
            None => self
                .manager
                .current_database()?
                .table(&insert.table_name)?
                .fields
                .iter()
                .map(|field| field.name.clone())
                .collect(),
        };
        let mut rows = vec![];
        for values in insert.values {
            if values.len() != columns.len() {
                return Err(DbError::schema(format!(
                    "INSERT supplies {} values but table `{}` has {} columns",
                    values.len(),
                    insert.table_name,
                    columns.len()
                )));
            }
            rows.push(columns.iter().cloned().zip(values).collect::<Vec<(String, Option<String>)>>());
        }

        let table = insert.table_name;
        if rows.len() == 1 {
            self.manager.insert_data(&table, &rows[0])?;
            return Ok(StatementOutcome::Affected(1));
        }
        self.in_statement_transaction(|manager| {
            let mut inserted = 0;
            let mut first_failure = None;
            for (index, row) in rows.iter().enumerate() {
                match manager.insert_data(&table, row) {
                    Ok(()) => inserted += 1,
                    Err(error) => {
                        warn!(table = %table, row = index + 1, %error, "INSERT row rejected");
                        if first_failure.is_none() {
                            first_failure = Some(error);
                        }
                    }
                }
            }
            Ok((inserted, first_failure))
        })
    }

    // Runs `work` inside the user's transaction, or inside an implicit one that
    // is rolled back when any row failed. `work` returns the affected count and
    // the first row failure.
    fn in_statement_transaction<F>(&mut self, work: F) -> Result<StatementOutcome>
    where
        F: FnOnce(&mut Manager) -> Result<(usize, Option<DbError>)>,
    {
        let implicit = !self.manager.in_transaction();
        if implicit {
            self.manager.begin_transaction()?;
        }
        let result = work(&mut self.manager);
        let failure = match result {
            Ok((affected, None)) => {
                if implicit {
                    self.manager.commit_transaction()?;
                }
                return Ok(StatementOutcome::Affected(affected));
            }
            Ok((_, Some(failure))) => failure,
            Err(error) => error,
        };
        if implicit {
            debug!("rolling back implicit statement transaction");
            if let Err(rollback_error) = self.manager.rollback_transaction() {
                error!(%rollback_error, "implicit rollback failed");
            }
        }
        Err(failure)
    }
}
